//! Connection manager — handles connection lifecycle (accept, add, remove)
//! and room-scoped broadcast.

use std::fmt::Display;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::{Sink, Stream, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use roomchat_core::config::RealtimeConfig;
use roomchat_core::types::ConnectionId;

use crate::error::RealtimeError;
use crate::message::types::Event;
use crate::metrics::RealtimeMetrics;
use crate::router::EventRouter;

use super::handle::Connection;
use super::pool::ConnectionPool;
use super::reader::run_inbound;
use super::writer::run_outbound;

/// Result of one broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BroadcastOutcome {
    /// Connections the event was queued for.
    pub delivered: usize,
    /// Connections evicted because their queue was full.
    pub evicted: Vec<ConnectionId>,
    /// Targets that were already closing.
    pub dropped: usize,
}

/// Manages all active WebSocket connections.
#[derive(Debug)]
pub struct ConnectionManager {
    /// Connection pool.
    pool: ConnectionPool,
    /// Event router shared by every inbound loop.
    router: Arc<EventRouter>,
    /// Metrics.
    metrics: Arc<RealtimeMetrics>,
    /// Configuration.
    config: RealtimeConfig,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(config: RealtimeConfig, router: Arc<EventRouter>) -> Self {
        Self {
            pool: ConnectionPool::new(),
            router,
            metrics: Arc::new(RealtimeMetrics::new()),
            config,
        }
    }

    /// Creates and registers a connection without starting its loops.
    ///
    /// Returns the connection handle and a receiver for outbound events.
    pub fn open(&self, granted_room: Option<String>) -> (Arc<Connection>, mpsc::Receiver<Event>) {
        let (conn, queue) = Connection::open(
            granted_room,
            self.config.outbound_queue_capacity,
            self.config.pong_wait(),
        );
        self.add(Arc::clone(&conn));
        (conn, queue)
    }

    /// Registers a connection.
    pub fn add(&self, conn: Arc<Connection>) {
        let conn_id = conn.id;
        let room = conn.room();
        self.pool.add(conn);
        self.metrics.connection_opened();

        info!(conn_id = %conn_id, room = %room, "WebSocket connection registered");
    }

    /// Unregisters a connection and closes it.
    ///
    /// Returns `true` if this call removed it; later calls are no-ops.
    pub fn remove(&self, conn: &Connection) -> bool {
        let removed = self.pool.remove(&conn.id).is_some();
        conn.close();

        if removed {
            self.metrics.connection_closed();
            info!(conn_id = %conn.id, room = %conn.room(), "WebSocket connection unregistered");
        }
        removed
    }

    /// Queues `event` for every connection whose room is `room`, except
    /// `exclude`.
    ///
    /// Targets are snapshotted first; no lock is held while queueing. A
    /// target whose queue is full is evicted and the broadcast continues.
    pub fn broadcast(
        &self,
        event: &Event,
        room: &str,
        exclude: Option<ConnectionId>,
    ) -> BroadcastOutcome {
        let targets = self.pool.room_members(room);
        let mut outcome = BroadcastOutcome::default();

        for conn in targets {
            if exclude == Some(conn.id) {
                continue;
            }
            match conn.enqueue(event.clone()) {
                Ok(()) => outcome.delivered += 1,
                Err(RealtimeError::QueueFull(conn_id)) => {
                    warn!(
                        conn_id = %conn_id,
                        room = %room,
                        "Outbound queue full, evicting stalled connection"
                    );
                    self.metrics.eviction();
                    self.remove(&conn);
                    outcome.evicted.push(conn_id);
                }
                Err(e) => {
                    debug!(conn_id = %conn.id, error = %e, "Skipping closed broadcast target");
                    outcome.dropped += 1;
                }
            }
        }

        self.metrics
            .broadcast((outcome.evicted.len() + outcome.dropped) as u64);
        outcome
    }

    /// Takes over an upgraded socket: registers the connection and spawns
    /// its inbound and outbound loops. Returns immediately.
    pub fn accept(
        self: &Arc<Self>,
        socket: WebSocket,
        granted_room: Option<String>,
    ) -> Arc<Connection> {
        let (writer, reader) = socket.split();
        self.accept_split(writer, reader, granted_room)
    }

    /// Same as [`accept`](Self::accept) for an already split transport.
    pub fn accept_split<W, R, E>(
        self: &Arc<Self>,
        writer: W,
        reader: R,
        granted_room: Option<String>,
    ) -> Arc<Connection>
    where
        W: Sink<Message> + Unpin + Send + 'static,
        W::Error: Display + Send,
        R: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
        E: Display + Send + 'static,
    {
        let (conn, queue) = self.open(granted_room);

        tokio::spawn(run_outbound(
            Arc::clone(&conn),
            writer,
            queue,
            Arc::clone(self),
        ));
        tokio::spawn(run_inbound(Arc::clone(&conn), reader, Arc::clone(self)));

        conn
    }

    /// Closes all connections.
    pub fn close_all(&self) {
        let all = self.pool.drain();
        for conn in &all {
            conn.close();
            self.metrics.connection_closed();
        }
        info!(count = all.len(), "All connections closed");
    }

    /// Whether the connection is registered.
    pub fn contains(&self, conn_id: &ConnectionId) -> bool {
        self.pool.contains(conn_id)
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Returns the number of distinct non-empty rooms.
    pub fn room_count(&self) -> usize {
        self.pool.room_count()
    }

    /// Returns the event router.
    pub fn router(&self) -> &EventRouter {
        &self.router
    }

    /// Returns the metrics.
    pub fn metrics(&self) -> &Arc<RealtimeMetrics> {
        &self.metrics
    }

    /// Returns the realtime configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }
}
