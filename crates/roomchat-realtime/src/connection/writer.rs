//! Outbound loop: drains the connection's queue onto the wire and sends
//! heartbeat pings.

use std::fmt::Display;
use std::sync::Arc;

use axum::extract::ws::Message;
use bytes::Bytes;
use futures::{Sink, SinkExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::RealtimeError;
use crate::message::serializer::encode_event;
use crate::message::types::Event;

use super::handle::Connection;
use super::heartbeat::ping_ticker;
use super::manager::ConnectionManager;

/// Drive the outbound side of `conn`. Events are written in queue order.
/// On close a best-effort close frame goes out before the loop exits, and
/// the connection is always removed from the registry.
pub async fn run_outbound<W>(
    conn: Arc<Connection>,
    mut writer: W,
    mut queue: mpsc::Receiver<Event>,
    manager: Arc<ConnectionManager>,
) where
    W: Sink<Message> + Unpin,
    W::Error: Display,
{
    let mut ticker = ping_ticker(manager.config().ping_interval());

    let result: Result<(), RealtimeError> = loop {
        // Pings go ahead of queued events so a busy queue cannot starve the
        // heartbeat. `Connection` owns the queue sender and outlives this
        // loop, so `recv` never yields `None`; shutdown comes via `closed`.
        tokio::select! {
            biased;

            _ = conn.closed() => {
                let _ = writer.send(Message::Close(None)).await;
                break Ok(());
            }

            _ = ticker.tick() => {
                if let Err(e) = writer.send(Message::Ping(Bytes::new())).await {
                    break Err(RealtimeError::Transport(e.to_string()));
                }
            }

            Some(event) = queue.recv() => {
                let text = match encode_event(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(conn_id = %conn.id, error = %e, "Dropping unencodable event");
                        continue;
                    }
                };
                if let Err(e) = writer.send(Message::Text(text.into())).await {
                    break Err(RealtimeError::Transport(e.to_string()));
                }
                manager.metrics().message_sent();
            }
        }
    };

    match result {
        Ok(()) => debug!(conn_id = %conn.id, "Outbound loop finished"),
        Err(e) => warn!(conn_id = %conn.id, error = %e, "Outbound loop terminated"),
    }
    manager.remove(&conn);
}
