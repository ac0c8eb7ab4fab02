use crate::events::ConversationRole;
use chrono::{DateTime, Local};
use std::fmt;

/// Session-unique message identifier, increasing in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single entry in the conversation log
#[derive(Debug, Clone)]
pub struct Message {
    pub id: MessageId,
    pub role: ConversationRole,
    pub text: String,
    pub timestamp: DateTime<Local>,
    /// Only set on assistant messages produced by a failed request
    pub is_error: bool,
}

impl Message {
    pub fn user(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            role: ConversationRole::User,
            text: text.into(),
            timestamp: Local::now(),
            is_error: false,
        }
    }

    pub fn assistant(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            role: ConversationRole::Assistant,
            text: text.into(),
            timestamp: Local::now(),
            is_error: false,
        }
    }

    pub fn assistant_error(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::assistant(id, text)
        }
    }

    /// Display time, `HH:MM`
    pub fn formatted_time(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}
