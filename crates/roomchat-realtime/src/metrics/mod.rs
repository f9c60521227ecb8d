//! Realtime engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level metrics counters.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    /// Total connections established
    connections_opened: AtomicU64,
    /// Total connections removed from the registry
    connections_closed: AtomicU64,
    /// Connections currently registered
    connections_active: AtomicU64,
    /// Total events decoded from clients
    messages_received: AtomicU64,
    /// Total events written to clients
    messages_sent: AtomicU64,
    /// Total broadcast calls
    broadcasts: AtomicU64,
    /// Total enqueues dropped because the target was full or gone
    broadcast_drops: AtomicU64,
    /// Total connections evicted for a stalled queue
    evictions: AtomicU64,
}

impl RealtimeMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new connection
    pub fn connection_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a disconnection
    pub fn connection_closed(&self) {
        self.connections_closed.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_sub(1, Ordering::Relaxed);
    }

    /// Record an inbound event
    pub fn message_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an outbound event written to the wire
    pub fn message_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a broadcast that dropped `dropped` targets
    pub fn broadcast(&self, dropped: u64) {
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
        self.broadcast_drops.fetch_add(dropped, Ordering::Relaxed);
    }

    /// Record an eviction
    pub fn eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_opened: self.connections_opened.load(Ordering::Relaxed),
            connections_closed: self.connections_closed.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            broadcasts: self.broadcasts.load(Ordering::Relaxed),
            broadcast_drops: self.broadcast_drops.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Total connections ever established
    pub connections_opened: u64,
    /// Total connections removed
    pub connections_closed: u64,
    /// Currently active connections
    pub connections_active: u64,
    /// Total events received
    pub messages_received: u64,
    /// Total events sent
    pub messages_sent: u64,
    /// Total broadcasts
    pub broadcasts: u64,
    /// Total dropped broadcast targets
    pub broadcast_drops: u64,
    /// Total stalled-peer evictions
    pub evictions: u64,
}
