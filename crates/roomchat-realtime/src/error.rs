//! Error taxonomy for the realtime core.
//!
//! Protocol errors on decode, transport errors and liveness failures end
//! the connection they occur on. Routing and handler errors are logged and
//! the connection keeps reading.

use std::time::Duration;

use thiserror::Error;

use roomchat_core::error::AppError;
use roomchat_core::types::ConnectionId;

/// Errors raised while reading, routing, or delivering events.
#[derive(Debug, Error)]
pub enum RealtimeError {
    // --- Routing / handler errors ---
    /// No handler is registered for the event type.
    #[error("no handler registered for event type '{0}'")]
    UnknownEvent(String),

    /// The payload does not match the shape the handler expects.
    #[error("invalid payload for event '{event_type}': {source}")]
    InvalidPayload {
        /// Event type whose payload failed to decode.
        event_type: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// An outbound event could not be serialized.
    #[error("failed to encode event '{event_type}': {source}")]
    Encode {
        /// Event type being encoded.
        event_type: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    // --- Protocol errors ---
    /// The frame is not a valid event envelope.
    #[error("malformed frame: {0}")]
    MalformedFrame(#[source] serde_json::Error),

    /// The frame exceeds the configured size limit.
    #[error("frame of {size} bytes exceeds limit of {limit} bytes")]
    FrameTooLarge {
        /// Size of the offending frame.
        size: usize,
        /// Configured maximum.
        limit: usize,
    },

    // --- Transport / liveness ---
    /// Reading from or writing to the transport failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// No pong arrived before the read deadline.
    #[error("no pong received within {0:?}")]
    ReadTimeout(Duration),

    /// The connection's outbound queue is full; the peer is stalled.
    #[error("outbound queue full for connection {0}")]
    QueueFull(ConnectionId),

    /// The connection has already been torn down.
    #[error("connection {0} is closed")]
    ConnectionClosed(ConnectionId),
}

impl RealtimeError {
    /// Whether this error ends the connection it occurred on.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            Self::UnknownEvent(_) | Self::InvalidPayload { .. } | Self::Encode { .. }
        )
    }
}

impl From<RealtimeError> for AppError {
    fn from(err: RealtimeError) -> Self {
        match &err {
            RealtimeError::UnknownEvent(_)
            | RealtimeError::InvalidPayload { .. }
            | RealtimeError::MalformedFrame(_)
            | RealtimeError::FrameTooLarge { .. } => AppError::validation(err.to_string()),
            RealtimeError::Encode { .. } => AppError::internal(err.to_string()),
            _ => AppError::realtime(err.to_string()),
        }
    }
}
