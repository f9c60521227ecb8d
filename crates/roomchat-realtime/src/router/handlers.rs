//! Built-in chat event handlers.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use roomchat_core::traits::MessageSink;
use roomchat_core::types::{ChatMessage, MessageId};

use crate::error::RealtimeError;
use crate::message::types::{
    ChangeRoomEvent, Event, NewMessageEvent, SendMessageEvent, event_type,
};

use super::{EventHandler, HandlerContext};

/// `send_message`: broadcast a `new_message` to the sender's room, sender
/// included, then hand the message to persistence.
#[derive(Debug, Default)]
pub struct SendMessageHandler {
    sink: Option<Arc<dyn MessageSink>>,
}

impl SendMessageHandler {
    /// Handler that persists through `sink`, if given.
    pub fn new(sink: Option<Arc<dyn MessageSink>>) -> Self {
        Self { sink }
    }
}

impl EventHandler for SendMessageHandler {
    fn handle(&self, event: &Event, ctx: &HandlerContext<'_>) -> Result<(), RealtimeError> {
        let incoming: SendMessageEvent = event.decode()?;
        let room = ctx.connection.room();
        let sent = Utc::now();

        let outgoing = Event::encode(
            event_type::NEW_MESSAGE,
            &NewMessageEvent {
                message: incoming.message.clone(),
                from: incoming.from.clone(),
                sent,
            },
        )?;

        let outcome = ctx.manager.broadcast(&outgoing, &room, None);
        debug!(
            conn_id = %ctx.connection.id,
            room = %room,
            delivered = outcome.delivered,
            evicted = outcome.evicted.len(),
            "Chat message broadcast"
        );

        if let Some(sink) = &self.sink {
            let sink = Arc::clone(sink);
            let record = ChatMessage {
                id: MessageId::new(),
                room,
                from: incoming.from,
                message: incoming.message,
                sent,
                connection_id: ctx.connection.id,
            };
            tokio::spawn(async move {
                let message_id = record.id;
                if let Err(e) = sink.persist(record).await {
                    warn!(message_id = %message_id, error = %e, "Failed to persist chat message");
                }
            });
        }

        Ok(())
    }
}

/// `change_room`: retag the connection. Takes effect for the next broadcast.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChangeRoomHandler;

impl EventHandler for ChangeRoomHandler {
    fn handle(&self, event: &Event, ctx: &HandlerContext<'_>) -> Result<(), RealtimeError> {
        let ChangeRoomEvent { name } = event.decode()?;
        debug!(
            conn_id = %ctx.connection.id,
            from = %ctx.connection.room(),
            to = %name,
            "Room changed"
        );
        ctx.connection.set_room(name);
        Ok(())
    }
}
