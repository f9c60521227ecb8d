//! Individual WebSocket connection handle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use roomchat_core::types::ConnectionId;

use crate::error::RealtimeError;
use crate::message::types::Event;

use super::heartbeat::Liveness;

/// A handle to a single WebSocket connection.
///
/// The transport itself is owned by the connection's inbound and outbound
/// loops; everything else talks to the peer through the bounded outbound
/// queue held here.
#[derive(Debug)]
pub struct Connection {
    /// Unique connection ID
    pub id: ConnectionId,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    /// Room granted by the upgrade step, if any
    granted_room: Option<String>,
    /// Current room tag
    room: RwLock<String>,
    /// Sender for outbound events
    sender: mpsc::Sender<Event>,
    /// Read deadline state
    liveness: Liveness,
    /// Fired once when the connection is torn down
    shutdown: CancellationToken,
    closed: AtomicBool,
}

impl Connection {
    /// Open a connection with an empty outbound queue of `capacity` events
    /// and a fresh liveness window.
    ///
    /// The room starts as the granted room, or empty when none was granted.
    /// Returns the handle and the receiving end of the outbound queue.
    pub fn open(
        granted_room: Option<String>,
        capacity: usize,
        pong_wait: Duration,
    ) -> (Arc<Self>, mpsc::Receiver<Event>) {
        let (sender, receiver) = mpsc::channel(capacity);
        let room = granted_room.clone().unwrap_or_default();
        let connection = Self {
            id: ConnectionId::new(),
            connected_at: Utc::now(),
            granted_room,
            room: RwLock::new(room),
            sender,
            liveness: Liveness::new(pong_wait),
            shutdown: CancellationToken::new(),
            closed: AtomicBool::new(false),
        };
        (Arc::new(connection), receiver)
    }

    /// Current room tag.
    pub fn room(&self) -> String {
        self.room.read().clone()
    }

    /// Whether the connection currently carries `room`.
    pub fn is_in_room(&self, room: &str) -> bool {
        *self.room.read() == room
    }

    /// Replace the room tag.
    pub fn set_room(&self, name: impl Into<String>) {
        *self.room.write() = name.into();
    }

    /// Room granted at upgrade time, if any.
    pub fn granted_room(&self) -> Option<&str> {
        self.granted_room.as_deref()
    }

    /// Queue an event without waiting.
    ///
    /// A full queue means the peer is not draining; the caller decides
    /// whether to evict.
    pub fn enqueue(&self, event: Event) -> Result<(), RealtimeError> {
        if self.is_closed() {
            return Err(RealtimeError::ConnectionClosed(self.id));
        }
        match self.sender.try_send(event) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => Err(RealtimeError::QueueFull(self.id)),
            Err(mpsc::error::TrySendError::Closed(_)) => {
                Err(RealtimeError::ConnectionClosed(self.id))
            }
        }
    }

    /// Record a pong and push the read deadline forward.
    pub fn handle_pong(&self) {
        self.liveness.handle_pong();
    }

    /// Instant after which the next read fails.
    pub fn read_deadline(&self) -> Instant {
        self.liveness.deadline()
    }

    /// Read deadline window.
    pub fn pong_wait(&self) -> Duration {
        self.liveness.pong_wait()
    }

    /// Signal both loops to stop. Returns `true` only for the first call.
    pub fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.shutdown.cancel();
        true
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Resolves once the connection is closed.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.shutdown.cancelled()
    }

    /// Get a snapshot of connection info
    pub fn info(&self) -> ConnectionInfo {
        ConnectionInfo {
            id: self.id,
            room: self.room(),
            granted_room: self.granted_room.clone(),
            connected_at: self.connected_at,
            last_pong: self.liveness.last_pong(),
            queued: self.sender.max_capacity() - self.sender.capacity(),
            alive: !self.is_closed(),
        }
    }
}

/// Snapshot of connection info (serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Connection ID
    pub id: ConnectionId,
    /// Current room tag
    pub room: String,
    /// Room granted at upgrade
    pub granted_room: Option<String>,
    /// Connected at
    pub connected_at: DateTime<Utc>,
    /// Last pong received
    pub last_pong: Option<DateTime<Utc>>,
    /// Events waiting in the outbound queue
    pub queued: usize,
    /// Is alive
    pub alive: bool,
}
