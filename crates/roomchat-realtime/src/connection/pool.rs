//! Connection pool — the set of live connections, indexed by connection ID.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use roomchat_core::types::ConnectionId;

use super::handle::Connection;

/// Thread-safe pool of all active WebSocket connections.
///
/// One lock guards the whole map. Callers take snapshots and release the
/// lock before doing anything that could block on a peer.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    by_id: RwLock<HashMap<ConnectionId, Arc<Connection>>>,
}

impl ConnectionPool {
    /// Creates a new empty connection pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to the pool.
    pub fn add(&self, connection: Arc<Connection>) {
        self.by_id.write().insert(connection.id, connection);
    }

    /// Removes a connection from the pool, returning it if it was present.
    pub fn remove(&self, conn_id: &ConnectionId) -> Option<Arc<Connection>> {
        self.by_id.write().remove(conn_id)
    }

    /// Whether the connection is registered.
    pub fn contains(&self, conn_id: &ConnectionId) -> bool {
        self.by_id.read().contains_key(conn_id)
    }

    /// Snapshot of the connections currently carrying `room`.
    pub fn room_members(&self, room: &str) -> Vec<Arc<Connection>> {
        self.by_id
            .read()
            .values()
            .filter(|conn| conn.is_in_room(room))
            .cloned()
            .collect()
    }

    /// Removes and returns every connection.
    pub fn drain(&self) -> Vec<Arc<Connection>> {
        self.by_id.write().drain().map(|(_, conn)| conn).collect()
    }

    /// Returns total number of active connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.read().len()
    }

    /// Returns the number of distinct non-empty room tags in use.
    pub fn room_count(&self) -> usize {
        let guard = self.by_id.read();
        let mut rooms: Vec<String> = guard
            .values()
            .map(|conn| conn.room())
            .filter(|room| !room.is_empty())
            .collect();
        rooms.sort_unstable();
        rooms.dedup();
        rooms.len()
    }
}
