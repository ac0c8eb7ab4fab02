pub mod conversation;
pub mod header;
