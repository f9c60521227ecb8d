//! Ping/pong liveness for WebSocket connections.
//!
//! The outbound loop pings every `ping_interval`; the inbound loop reads
//! with a deadline that only a pong pushes forward. A peer that stops
//! answering lets the deadline lapse and its connection is torn down.

use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Read-deadline state for one connection.
#[derive(Debug)]
pub struct Liveness {
    pong_wait: Duration,
    deadline: Mutex<Instant>,
    last_pong: Mutex<Option<DateTime<Utc>>>,
}

impl Liveness {
    /// Start a fresh liveness window ending `pong_wait` from now.
    pub fn new(pong_wait: Duration) -> Self {
        Self {
            pong_wait,
            deadline: Mutex::new(Instant::now() + pong_wait),
            last_pong: Mutex::new(None),
        }
    }

    /// Record a pong and move the read deadline to now + `pong_wait`.
    pub fn handle_pong(&self) {
        *self.deadline.lock() = Instant::now() + self.pong_wait;
        *self.last_pong.lock() = Some(Utc::now());
    }

    /// Instant after which the next read fails.
    pub fn deadline(&self) -> Instant {
        *self.deadline.lock()
    }

    /// Wall-clock time of the last pong, if any arrived.
    pub fn last_pong(&self) -> Option<DateTime<Utc>> {
        *self.last_pong.lock()
    }

    /// Length of the read deadline window.
    pub fn pong_wait(&self) -> Duration {
        self.pong_wait
    }
}

/// Ticker for the outbound loop. The first ping goes out one full
/// interval after the connection opens.
pub fn ping_ticker(ping_interval: Duration) -> Interval {
    let mut ticker = time::interval_at(Instant::now() + ping_interval, ping_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
