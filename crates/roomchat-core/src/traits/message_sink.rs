//! Persistence handoff for broadcast chat messages.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::message::ChatMessage;

/// Receives chat messages for durable storage after they have been broadcast.
///
/// The realtime core calls this on a detached task. An error is logged and
/// never affects delivery of the broadcast that produced the message.
#[async_trait]
pub trait MessageSink: Send + Sync + std::fmt::Debug + 'static {
    /// Store one chat message.
    async fn persist(&self, message: ChatMessage) -> AppResult<()>;
}
