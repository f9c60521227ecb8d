//! # roomchat-realtime
//!
//! Real-time WebSocket engine for RoomChat. Provides:
//!
//! - Connection registry with room-scoped broadcast
//! - Per-connection inbound/outbound loops with ping/pong liveness
//! - Typed event envelope and a handler router
//! - Bounded outbound queues with stalled-peer eviction
//! - Handoff of chat messages to an external persistence sink

pub mod connection;
pub mod error;
pub mod message;
pub mod metrics;
pub mod router;
pub mod server;

pub use connection::manager::{BroadcastOutcome, ConnectionManager};
pub use error::RealtimeError;
pub use message::types::Event;
pub use router::{EventHandler, EventRouter, HandlerContext};
pub use server::RealtimeEngine;
