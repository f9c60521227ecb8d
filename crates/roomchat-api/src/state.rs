//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use roomchat_core::config::AppConfig;
use roomchat_core::traits::{MessageSink, RoomGate};
use roomchat_realtime::server::RealtimeEngine;

use crate::middleware::OriginPolicy;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// WebSocket realtime engine
    pub realtime: Arc<RealtimeEngine>,
    /// Decides which rooms an upgrade may start in
    pub room_gate: Arc<dyn RoomGate>,
    /// Origins allowed to upgrade
    pub origins: Arc<OriginPolicy>,
}

impl AppState {
    /// Wire the realtime engine and upgrade policies from configuration.
    pub fn new(
        config: AppConfig,
        sink: Option<Arc<dyn MessageSink>>,
        room_gate: Arc<dyn RoomGate>,
    ) -> Self {
        let realtime = Arc::new(RealtimeEngine::new(config.realtime.clone(), sink));
        let origins = Arc::new(OriginPolicy::new(&config.server.allowed_origins));

        Self {
            config: Arc::new(config),
            realtime,
            room_gate,
            origins,
        }
    }
}
