//! Event envelope and the built-in payload shapes.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::RealtimeError;

/// Built-in event type tags.
pub mod event_type {
    /// Client → server: post a chat message to the current room.
    pub const SEND_MESSAGE: &str = "send_message";
    /// Server → clients: a chat message broadcast to a room.
    pub const NEW_MESSAGE: &str = "new_message";
    /// Client → server: move this connection to another room.
    pub const CHANGE_ROOM: &str = "change_room";
}

/// Wire envelope exchanged over a connection.
///
/// The payload stays opaque JSON until the handler registered for
/// `event_type` decodes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event type tag.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Undecoded payload (`null` when the client omitted it).
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Event {
    /// Create an event from an already-built JSON payload.
    pub fn new(event_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
        }
    }

    /// Create an event by serializing a typed payload.
    pub fn encode<T: Serialize>(event_type: &str, payload: &T) -> Result<Self, RealtimeError> {
        let payload = serde_json::to_value(payload).map_err(|source| RealtimeError::Encode {
            event_type: event_type.to_string(),
            source,
        })?;
        Ok(Self::new(event_type, payload))
    }

    /// Decode the payload into the shape expected by a handler.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, RealtimeError> {
        T::deserialize(&self.payload).map_err(|source| RealtimeError::InvalidPayload {
            event_type: self.event_type.clone(),
            source,
        })
    }
}

/// Payload of `send_message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageEvent {
    /// Message body.
    pub message: String,
    /// Sender display name.
    pub from: String,
}

/// Payload of `new_message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessageEvent {
    /// Message body.
    pub message: String,
    /// Sender display name.
    pub from: String,
    /// When the server broadcast the message.
    pub sent: DateTime<Utc>,
}

/// Payload of `change_room`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRoomEvent {
    /// Target room tag.
    pub name: String,
}
