//! JSON framing for events.

use crate::error::RealtimeError;

use super::types::Event;

/// Serialize an outbound event into a text frame.
pub fn encode_event(event: &Event) -> Result<String, RealtimeError> {
    serde_json::to_string(event).map_err(|source| RealtimeError::Encode {
        event_type: event.event_type.clone(),
        source,
    })
}

/// Decode one inbound frame into an event envelope.
pub fn decode_frame(frame: &[u8]) -> Result<Event, RealtimeError> {
    serde_json::from_slice(frame).map_err(RealtimeError::MalformedFrame)
}
