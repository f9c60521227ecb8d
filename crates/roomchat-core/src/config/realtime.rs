//! Real-time WebSocket engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Real-time (WebSocket) engine configuration.
///
/// The read deadline (`pong_wait_seconds`) must be longer than the ping
/// interval, otherwise a pong answering the latest ping cannot arrive in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// How long to wait for a pong before the connection is considered dead.
    #[serde(default = "default_pong_wait")]
    pub pong_wait_seconds: u64,
    /// How often the server pings each connection, in milliseconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_ms: u64,
    /// Maximum inbound frame size in bytes.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
    /// Per-connection outbound queue capacity.
    #[serde(default = "default_outbound_queue_capacity")]
    pub outbound_queue_capacity: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            pong_wait_seconds: default_pong_wait(),
            ping_interval_ms: default_ping_interval(),
            max_frame_bytes: default_max_frame_bytes(),
            outbound_queue_capacity: default_outbound_queue_capacity(),
        }
    }
}

impl RealtimeConfig {
    /// Returns the read deadline window as a Duration.
    pub fn pong_wait(&self) -> Duration {
        Duration::from_secs(self.pong_wait_seconds)
    }

    /// Returns the ping interval as a Duration.
    pub fn ping_interval(&self) -> Duration {
        Duration::from_millis(self.ping_interval_ms)
    }

    /// Validates the heartbeat timing and buffer sizes.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.ping_interval_ms == 0 {
            return Err(AppError::configuration(
                "realtime.ping_interval_ms must be greater than zero",
            ));
        }
        if self.ping_interval() >= self.pong_wait() {
            return Err(AppError::configuration(format!(
                "realtime.ping_interval_ms ({}) must be shorter than realtime.pong_wait_seconds ({}s)",
                self.ping_interval_ms, self.pong_wait_seconds
            )));
        }
        if self.max_frame_bytes == 0 {
            return Err(AppError::configuration(
                "realtime.max_frame_bytes must be greater than zero",
            ));
        }
        if self.outbound_queue_capacity == 0 {
            return Err(AppError::configuration(
                "realtime.outbound_queue_capacity must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn default_pong_wait() -> u64 {
    10
}

fn default_ping_interval() -> u64 {
    // 90% of the pong wait
    9_000
}

fn default_max_frame_bytes() -> usize {
    512
}

fn default_outbound_queue_capacity() -> usize {
    64
}
