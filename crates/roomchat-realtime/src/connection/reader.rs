//! Inbound loop: reads frames, enforces the read deadline and frame limit,
//! and hands decoded events to the router.

use std::fmt::Display;
use std::sync::Arc;

use axum::extract::ws::Message;
use futures::{Stream, StreamExt};
use tokio::time;
use tracing::{debug, info, warn};

use crate::error::RealtimeError;
use crate::message::serializer::decode_frame;
use crate::message::validator::{is_expected_close, validate_frame_size};
use crate::router::HandlerContext;

use super::handle::Connection;
use super::manager::ConnectionManager;

/// Drive the inbound side of `conn` until the peer leaves, a terminal
/// error occurs, or the connection is closed elsewhere. Always ends by
/// removing the connection from the registry.
pub async fn run_inbound<R, E>(
    conn: Arc<Connection>,
    mut reader: R,
    manager: Arc<ConnectionManager>,
) where
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    match read_events(&conn, &mut reader, &manager).await {
        Ok(()) => debug!(conn_id = %conn.id, "Inbound loop finished"),
        Err(RealtimeError::ReadTimeout(wait)) => {
            info!(conn_id = %conn.id, wait = ?wait, "Peer stopped answering pings")
        }
        Err(e) => warn!(conn_id = %conn.id, error = %e, "Inbound loop terminated"),
    }
    manager.remove(&conn);
}

async fn read_events<R, E>(
    conn: &Arc<Connection>,
    reader: &mut R,
    manager: &ConnectionManager,
) -> Result<(), RealtimeError>
where
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let limit = manager.config().max_frame_bytes;

    loop {
        let next = tokio::select! {
            _ = conn.closed() => return Ok(()),
            next = time::timeout_at(conn.read_deadline(), reader.next()) => next,
        };

        let message = match next {
            Err(_) => return Err(RealtimeError::ReadTimeout(conn.pong_wait())),
            Ok(None) => return Ok(()),
            Ok(Some(Err(e))) => return Err(RealtimeError::Transport(e.to_string())),
            Ok(Some(Ok(message))) => message,
        };

        let handled = match message {
            Message::Text(text) => handle_frame(conn, manager, text.as_str().as_bytes(), limit),
            Message::Binary(data) => handle_frame(conn, manager, &data, limit),
            Message::Pong(_) => {
                conn.handle_pong();
                Ok(())
            }
            // answered by the transport
            Message::Ping(_) => Ok(()),
            Message::Close(frame) => {
                if is_expected_close(frame.as_ref()) {
                    debug!(conn_id = %conn.id, frame = ?frame, "Peer closed connection");
                } else {
                    warn!(
                        conn_id = %conn.id,
                        frame = ?frame,
                        "Peer closed connection unexpectedly"
                    );
                }
                return Ok(());
            }
        };

        match handled {
            Err(e) if e.is_terminal() => return Err(e),
            Err(e) => warn!(conn_id = %conn.id, error = %e, "Failed to handle event"),
            Ok(()) => {}
        }
    }
}

fn handle_frame(
    conn: &Arc<Connection>,
    manager: &ConnectionManager,
    frame: &[u8],
    limit: usize,
) -> Result<(), RealtimeError> {
    validate_frame_size(frame.len(), limit)?;
    let event = decode_frame(frame)?;
    manager.metrics().message_received();

    let ctx = HandlerContext {
        connection: conn,
        manager,
    };
    manager.router().dispatch(&event, &ctx)
}
