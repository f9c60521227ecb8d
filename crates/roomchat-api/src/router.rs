//! Route definitions for the RoomChat HTTP surface.

use axum::{Router, routing::get};

use crate::handlers;
use crate::state::AppState;

/// Build the Axum router with all routes.
///
/// Receives the fully-constructed `AppState` and threads it through
/// every route via `.with_state(state)`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", health_routes())
        .merge(ws_routes())
        .with_state(state)
}

/// WebSocket upgrade endpoints
fn ws_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(handlers::ws::ws_upgrade))
        .route("/ws/{room_code}", get(handlers::ws::ws_room_upgrade))
}

/// Health endpoint
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
