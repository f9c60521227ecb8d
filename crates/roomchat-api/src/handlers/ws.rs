//! WebSocket upgrade handlers.

use std::sync::Arc;

use axum::extract::{Path, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::Response;
use tracing::{debug, warn};

use roomchat_core::error::AppError;

use crate::error::ApiResult;
use crate::state::AppState;

/// GET /ws — upgrade without a room; the client picks one with
/// `change_room`.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> ApiResult<Response> {
    state.origins.check(&headers)?;
    Ok(upgrade(&state, ws, None))
}

/// GET /ws/{room_code} — upgrade straight into a room the gate admits.
pub async fn ws_room_upgrade(
    State(state): State<AppState>,
    Path(room_code): Path<String>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> ApiResult<Response> {
    state.origins.check(&headers)?;

    match state.room_gate.admit(&room_code).await {
        Ok(true) => {}
        Ok(false) => {
            debug!(room = %room_code, "Room admission refused");
            return Err(AppError::authorization(format!(
                "Not allowed to join room '{room_code}'"
            ))
            .into());
        }
        Err(e) => {
            warn!(room = %room_code, error = %e, "Room admission check failed");
            return Err(AppError::authorization(format!(
                "Could not verify access to room '{room_code}'"
            ))
            .into());
        }
    }

    Ok(upgrade(&state, ws, Some(room_code)))
}

fn upgrade(state: &AppState, ws: WebSocketUpgrade, granted_room: Option<String>) -> Response {
    let max = state.config.realtime.max_frame_bytes;
    let connections = Arc::clone(&state.realtime.connections);

    ws.max_message_size(max)
        .max_frame_size(max)
        .on_failed_upgrade(|e| warn!(error = %e, "WebSocket upgrade failed"))
        .on_upgrade(move |socket| async move {
            connections.accept(socket, granted_room);
        })
}
