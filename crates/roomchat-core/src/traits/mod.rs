//! Collaborator traits defined in `roomchat-core` and implemented outside the realtime core.

pub mod message_sink;
pub mod room_gate;

pub use message_sink::MessageSink;
pub use room_gate::{OpenRoomGate, RoomGate};
