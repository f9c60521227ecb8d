//! # roomchat-api
//!
//! HTTP layer for RoomChat built on Axum.
//!
//! Provides the WebSocket upgrade endpoints (origin policy and room gate
//! applied before the upgrade), the health endpoint, error mapping, and the
//! server runner with graceful shutdown.

pub mod app;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server, serve};
pub use state::AppState;
