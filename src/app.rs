use crate::ask::{AskBackend, AskError, AskRequest};
use crate::config::Config;
use crate::conversation::ConversationController;
use crate::events::{AppEvent, TuiEvent};
use crate::tui::{self, Tui};
use crate::ui::conversation::{ConversationAction, ConversationManager};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Delivers exactly one outcome for a dispatched request.
///
/// If the request task is aborted or panics before calling
/// [`PendingGuard::complete`], dropping the guard reports
/// [`AskError::Aborted`] so the conversation always leaves the pending state.
pub struct PendingGuard {
    tx: Option<mpsc::UnboundedSender<AppEvent>>,
}

impl PendingGuard {
    pub fn new(tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn complete(mut self, outcome: Result<String, AskError>) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(AppEvent::AnswerReady(outcome));
        }
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            tracing::warn!("request task ended without an outcome");
            let _ = tx.send(AppEvent::AnswerReady(Err(AskError::Aborted)));
        }
    }
}

/// Run `request` on its own task, posting the outcome back to the UI loop
pub fn dispatch(
    backend: Arc<dyn AskBackend>,
    request: AskRequest,
    tx: mpsc::UnboundedSender<AppEvent>,
) -> JoinHandle<()> {
    let guard = PendingGuard::new(tx);
    tokio::spawn(async move {
        let outcome = backend.ask(&request).await;
        guard.complete(outcome);
    })
}

pub struct App {
    manager: ConversationManager,
    backend: Arc<dyn AskBackend>,
    tx: mpsc::UnboundedSender<AppEvent>,
    rx: mpsc::UnboundedReceiver<AppEvent>,
    should_quit: bool,
}

impl App {
    pub fn new(config: &Config, backend: Arc<dyn AskBackend>, endpoint: &str) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = ConversationController::new(config.default_top_k);
        tracing::info!(session = %controller.session_id(), endpoint, "conversation started");

        Self {
            manager: ConversationManager::new(controller, endpoint, config.ui.show_timestamps),
            backend,
            tx,
            rx,
            should_quit: false,
        }
    }

    pub fn manager(&self) -> &ConversationManager {
        &self.manager
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Main loop: draw, then wait for the next terminal event, tick or answer
    pub async fn run(&mut self, terminal: &mut Tui, config: &Config) -> Result<()> {
        tui::spawn_event_sources(self.tx.clone(), config.tick_rate());

        while !self.should_quit() {
            terminal.draw(|frame| frame.render_widget(&self.manager, frame.size()))?;

            match self.rx.recv().await {
                Some(event) => self.handle_event(event),
                None => break,
            }
        }

        Ok(())
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Terminal(TuiEvent::Key(key)) => {
                let action = self.manager.handle_key(key);
                self.perform(action);
            }
            AppEvent::Terminal(TuiEvent::Paste(text)) => {
                let action = self.manager.handle_paste(&text);
                self.perform(action);
            }
            AppEvent::Terminal(TuiEvent::Mouse(_) | TuiEvent::Resize(..)) => {}
            AppEvent::Tick => self.manager.on_tick(),
            AppEvent::AnswerReady(outcome) => self.manager.handle_answer(outcome),
        }
    }

    fn perform(&mut self, action: ConversationAction) {
        match action {
            ConversationAction::None => {}
            ConversationAction::Dispatch(request) => {
                dispatch(self.backend.clone(), request, self.tx.clone());
            }
            ConversationAction::Exit => self.should_quit = true,
        }
    }

    /// Wait for and apply the next queued event (test helper for the loop body)
    #[cfg(test)]
    async fn next_event(&mut self) {
        if let Some(event) = self.rx.recv().await {
            self.handle_event(event);
        }
    }
}
