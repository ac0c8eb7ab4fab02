use crate::ask::AskError;

/// Events consumed by the application loop
#[derive(Debug)]
pub enum AppEvent {
    /// Raw terminal input (key, paste, resize)
    Terminal(TuiEvent),

    /// Redraw tick, drives the typing indicator animation
    Tick,

    /// The in-flight `/ask` request resolved
    AnswerReady(Result<String, AskError>),
}

/// TUI-specific events (keyboard, mouse, etc.)
#[derive(Debug, Clone)]
pub enum TuiEvent {
    /// Key press event
    Key(crossterm::event::KeyEvent),

    /// Mouse event
    Mouse(crossterm::event::MouseEvent),

    /// Paste event
    Paste(String),

    /// Terminal resize
    Resize(u16, u16),
}

/// Author of a message in the conversation log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationRole {
    User,
    Assistant,
}

impl ConversationRole {
    pub fn display_name(&self) -> &'static str {
        match self {
            ConversationRole::User => "You",
            ConversationRole::Assistant => "Assistant",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ConversationRole::User => "👤",
            ConversationRole::Assistant => "🤖",
        }
    }
}
