//! Application builder — wires router + middleware + state into an Axum app.

use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;

use roomchat_core::config::AppConfig;
use roomchat_core::error::AppError;
use roomchat_core::traits::OpenRoomGate;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server);
    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Runs the RoomChat server with the given configuration until Ctrl+C.
///
/// No membership service or message store is wired in here: every room is
/// admitted and chat messages are not persisted.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting RoomChat server...");

    let addr = config.server.bind_address();
    let state = AppState::new(config, None, Arc::new(OpenRoomGate));

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("RoomChat server listening on {}", addr);

    serve(listener, state, shutdown_signal()).await
}

/// Serves the app on `listener` until `shutdown` resolves.
///
/// On shutdown every live connection is closed, then in-flight HTTP
/// requests get `server.shutdown_grace_seconds` to finish.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let grace = Duration::from_secs(state.config.server.shutdown_grace_seconds);
    let engine = Arc::clone(&state.realtime);
    let (stopping_tx, stopping_rx) = oneshot::channel();

    let server = axum::serve(listener, build_app(state))
        .with_graceful_shutdown(async move {
            shutdown.await;
            if let Err(e) = engine.shutdown().await {
                tracing::error!(error = %e, "Realtime engine shutdown failed");
            }
            let _ = stopping_tx.send(());
        })
        .into_future();
    tokio::pin!(server);

    let result = tokio::select! {
        biased;
        result = &mut server => result,
        Ok(()) = stopping_rx => match tokio::time::timeout(grace, &mut server).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(grace = ?grace, "Graceful shutdown timed out");
                Ok(())
            }
        },
    };

    result.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
    tracing::info!("RoomChat server stopped");
    Ok(())
}

/// Resolves on Ctrl+C.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
