use crate::ask::{AskError, AskRequest};
use crate::conversation::ConversationController;
use crate::ui::conversation::composer::ConversationResult;
use crate::ui::conversation::{get_help_text, ConversationComposer, ConversationHistory, ParsedCommand, SlashCommand};
use crate::ui::header::Header;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

const PLACEHOLDER: &str = "Ask me about SEBI cybersecurity policies...";
const PAGE: usize = 10;

/// Actions that can be requested by the conversation manager
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationAction {
    None,
    /// Send this request; the outcome must come back through [`ConversationManager::handle_answer`]
    Dispatch(AskRequest),
    Exit,
}

/// Ties the controller to the history view, composer and status line
pub struct ConversationManager {
    controller: ConversationController,
    history: ConversationHistory,
    composer: ConversationComposer,
    endpoint: String,
    status: Option<String>,
    tick: u64,
}

impl ConversationManager {
    pub fn new(controller: ConversationController, endpoint: impl Into<String>, show_timestamps: bool) -> Self {
        Self {
            controller,
            history: ConversationHistory::new(show_timestamps),
            composer: ConversationComposer::new(PLACEHOLDER),
            endpoint: endpoint.into(),
            status: None,
            tick: 0,
        }
    }

    pub fn controller(&self) -> &ConversationController {
        &self.controller
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ConversationAction {
        if key.kind != KeyEventKind::Press {
            return ConversationAction::None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('d') if ctrl => return ConversationAction::Exit,
            KeyCode::Esc => return ConversationAction::Exit,
            KeyCode::Char('l') if ctrl => {
                self.clear();
                return ConversationAction::None;
            }
            KeyCode::Tab => {
                let next = self.controller.retrieval_width().next();
                if self.controller.set_retrieval_width(next) {
                    self.status = Some(format!("Sources set to {}", next));
                }
                return ConversationAction::None;
            }
            KeyCode::PageUp => {
                self.history.scroll_up(PAGE);
                return ConversationAction::None;
            }
            KeyCode::PageDown => {
                self.history.scroll_down(PAGE);
                return ConversationAction::None;
            }
            _ => {}
        }

        let pending = self.controller.is_pending();
        let result = self.composer.handle_key(key, self.controller.draft(), pending);
        self.apply(result)
    }

    pub fn handle_paste(&mut self, text: &str) -> ConversationAction {
        let pending = self.controller.is_pending();
        let result = self.composer.handle_paste(text, self.controller.draft(), pending);
        self.apply(result)
    }

    /// Record the outcome of a dispatched request
    pub fn handle_answer(&mut self, outcome: Result<String, AskError>) {
        if self.controller.resolve(outcome).is_some() {
            self.history.scroll_to_bottom();
        }
    }

    fn apply(&mut self, result: ConversationResult) -> ConversationAction {
        match result {
            ConversationResult::Edited(text) => {
                self.controller.update_draft(text);
                ConversationAction::None
            }
            ConversationResult::Submitted(_) => match self.controller.submit_draft() {
                Some(request) => {
                    self.composer.clear();
                    self.history.scroll_to_bottom();
                    self.status = None;
                    ConversationAction::Dispatch(request)
                }
                None => ConversationAction::None,
            },
            ConversationResult::Command(command) => self.handle_slash_command(command),
            ConversationResult::None => ConversationAction::None,
        }
    }

    /// Handle slash commands
    fn handle_slash_command(&mut self, command: ParsedCommand) -> ConversationAction {
        if self.controller.is_pending() && !command.command.available_while_pending() {
            self.status = Some(format!("/{} is unavailable while waiting for an answer", command.command.command()));
            return ConversationAction::None;
        }

        // The command line itself never becomes part of the conversation
        self.controller.update_draft("");
        self.composer.clear();

        match command.command {
            SlashCommand::Clear => {
                self.clear();
                ConversationAction::None
            }
            SlashCommand::Sources => {
                match command.width_target() {
                    Some(width) => {
                        self.controller.set_retrieval_width(width);
                        self.status = Some(format!("Sources set to {}", width));
                    }
                    None => {
                        self.status = Some(format!(
                            "Usage: /sources <{}> (currently {})",
                            crate::conversation::RetrievalWidth::menu(),
                            self.controller.retrieval_width()
                        ));
                    }
                }
                ConversationAction::None
            }
            SlashCommand::Help => {
                self.status = Some(get_help_text());
                ConversationAction::None
            }
            SlashCommand::Quit => ConversationAction::Exit,
        }
    }

    fn clear(&mut self) {
        if self.controller.reset() {
            self.history.scroll_to_bottom();
            self.status = Some("Conversation cleared".to_string());
        } else {
            self.status = Some("Wait for the current answer before clearing".to_string());
        }
    }
}

impl Widget for &ConversationManager {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(5),    // History
                Constraint::Length(1), // Status
                Constraint::Length(4), // Composer
            ])
            .split(area);

        Header {
            retrieval_width: self.controller.retrieval_width(),
            pending: self.controller.is_pending(),
            endpoint: &self.endpoint,
        }
        .render(chunks[0], buf);

        self.history
            .widget(self.controller.messages(), self.controller.is_pending(), self.tick)
            .render(chunks[1], buf);

        if let Some(status) = &self.status {
            let line = Line::from(vec![Span::styled(status.as_str(), Style::default().fg(Color::Yellow))]);
            buf.set_line(chunks[2].x, chunks[2].y, &line, chunks[2].width);
        }

        self.composer
            .widget(self.controller.draft(), self.controller.is_pending())
            .render(chunks[3], buf);
    }
}
