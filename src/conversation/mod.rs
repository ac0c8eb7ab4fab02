//! Conversation state: message log, request lifecycle and retrieval width

pub mod controller;
pub mod message;
pub mod retrieval;

pub use controller::{ConversationController, FALLBACK_ERROR_TEXT, GREETING_TEXT};
pub use message::{Message, MessageId};
pub use retrieval::RetrievalWidth;
