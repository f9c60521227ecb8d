//! Health check handler.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use roomchat_realtime::metrics::MetricsSnapshot;

use crate::state::AppState;

/// Body of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the server answers
    pub status: String,
    /// Crate version
    pub version: String,
    /// Live connections
    pub connections: usize,
    /// Distinct non-empty rooms
    pub rooms: usize,
    /// Engine counters
    pub metrics: MetricsSnapshot,
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let connections = &state.realtime.connections;

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        connections: connections.connection_count(),
        rooms: connections.room_count(),
        metrics: state.realtime.metrics.snapshot(),
    })
}
