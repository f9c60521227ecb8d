//! Shared domain types.

pub mod id;
pub mod message;

pub use id::{ConnectionId, MessageId};
pub use message::ChatMessage;
