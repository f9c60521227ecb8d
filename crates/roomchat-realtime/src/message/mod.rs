//! WebSocket event types, serialization, and frame validation.

pub mod serializer;
pub mod types;
pub mod validator;

pub use types::{ChangeRoomEvent, Event, NewMessageEvent, SendMessageEvent, event_type};
