use crate::events::{AppEvent, TuiEvent};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stderr};
use std::time::Duration;
use tokio::sync::mpsc;

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

/// Forwards terminal input and redraw ticks into the application channel
pub fn spawn_event_sources(tx: mpsc::UnboundedSender<AppEvent>, tick_rate: Duration) {
    let tx_events = tx.clone();
    tokio::spawn(async move {
        let mut reader = event::EventStream::new();
        while let Some(evt) = reader.next().await {
            let evt = match evt {
                Ok(evt) => evt,
                Err(e) => {
                    tracing::error!(error = %e, "terminal event stream failed");
                    break;
                }
            };

            let app_event = match evt {
                // Only handle key press events, not release
                Event::Key(key) if key.kind == KeyEventKind::Press => Some(TuiEvent::Key(key)),
                Event::Mouse(mouse) => Some(TuiEvent::Mouse(mouse)),
                Event::Paste(text) => Some(TuiEvent::Paste(text)),
                Event::Resize(w, h) => Some(TuiEvent::Resize(w, h)),
                _ => None,
            };

            if let Some(event) = app_event {
                if tx_events.send(AppEvent::Terminal(event)).is_err() {
                    break;
                }
            }
        }
    });

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick_rate);
        loop {
            interval.tick().await;
            if tx.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    });
}

pub fn init() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    execute!(io::stderr(), EnterAlternateScreen, EnableBracketedPaste)
        .context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(io::stderr());
    let terminal = Terminal::new(backend)?;

    Ok(terminal)
}

pub fn restore() -> Result<()> {
    execute!(io::stderr(), DisableBracketedPaste, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

/// Install panic hook to restore terminal on panic
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore();
        original_hook(panic_info);
    }));
}
