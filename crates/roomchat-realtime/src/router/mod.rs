//! Event router — dispatches decoded events to the handler registered for
//! their type.

pub mod handlers;

use std::collections::HashMap;
use std::sync::Arc;

use roomchat_core::traits::MessageSink;

use crate::connection::handle::Connection;
use crate::connection::manager::ConnectionManager;
use crate::error::RealtimeError;
use crate::message::types::{Event, event_type};

pub use handlers::{ChangeRoomHandler, SendMessageHandler};

/// What a handler can reach while processing one event.
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    /// Connection the event arrived on.
    pub connection: &'a Arc<Connection>,
    /// Registry, for broadcasting.
    pub manager: &'a ConnectionManager,
}

/// Trait for event handler implementations.
///
/// Handlers run on the inbound task of the connection that received the
/// event, so they must not block. Anything slow goes to a spawned task.
pub trait EventHandler: Send + Sync + std::fmt::Debug {
    /// Process one event. The payload is still undecoded.
    fn handle(&self, event: &Event, ctx: &HandlerContext<'_>) -> Result<(), RealtimeError>;
}

/// Maps event type tags to handlers.
#[derive(Debug, Default)]
pub struct EventRouter {
    /// Registered handlers by type
    handlers: HashMap<String, Arc<dyn EventHandler>>,
}

impl EventRouter {
    /// Create an empty router
    pub fn new() -> Self {
        Self::default()
    }

    /// Router with the built-in chat handlers registered.
    ///
    /// `sink` receives every broadcast chat message; `None` skips persistence.
    pub fn with_defaults(sink: Option<Arc<dyn MessageSink>>) -> Self {
        let mut router = Self::new();
        router.register(
            event_type::SEND_MESSAGE,
            Arc::new(SendMessageHandler::new(sink)),
        );
        router.register(event_type::CHANGE_ROOM, Arc::new(ChangeRoomHandler));
        router
    }

    /// Register a handler. A later registration for the same type replaces
    /// the earlier one, which is returned.
    pub fn register(
        &mut self,
        event_type: impl Into<String>,
        handler: Arc<dyn EventHandler>,
    ) -> Option<Arc<dyn EventHandler>> {
        let event_type = event_type.into();
        tracing::debug!(event_type = %event_type, "Registered event handler");
        self.handlers.insert(event_type, handler)
    }

    /// Dispatch an event to its handler.
    pub fn dispatch(&self, event: &Event, ctx: &HandlerContext<'_>) -> Result<(), RealtimeError> {
        let handler = self
            .handlers
            .get(&event.event_type)
            .ok_or_else(|| RealtimeError::UnknownEvent(event.event_type.clone()))?;

        handler.handle(event, ctx)
    }

    /// Check if a handler is registered for an event type
    pub fn has_handler(&self, event_type: &str) -> bool {
        self.handlers.contains_key(event_type)
    }

    /// Get the list of registered event types
    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.handlers.keys().cloned().collect();
        types.sort();
        types
    }
}
