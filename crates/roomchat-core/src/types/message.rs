//! The chat message record handed to the persistence collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{ConnectionId, MessageId};

/// A chat message that has been broadcast to a room.
///
/// Produced by the realtime core after fan-out and passed to a
/// [`MessageSink`](crate::traits::MessageSink). The core keeps no copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Record identifier.
    pub id: MessageId,
    /// Room tag the sender was in when the message was broadcast.
    pub room: String,
    /// Display name supplied by the sender.
    pub from: String,
    /// Message body.
    pub message: String,
    /// Server timestamp stamped at broadcast time.
    pub sent: DateTime<Utc>,
    /// Connection the message arrived on.
    pub connection_id: ConnectionId,
}
