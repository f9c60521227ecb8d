//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use tracing::info;

use roomchat_core::config::RealtimeConfig;
use roomchat_core::error::AppError;
use roomchat_core::traits::MessageSink;

use crate::connection::manager::ConnectionManager;
use crate::metrics::RealtimeMetrics;
use crate::router::EventRouter;

/// Central real-time engine: the connection registry plus the router its
/// inbound loops dispatch through.
#[derive(Debug, Clone)]
pub struct RealtimeEngine {
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
}

impl RealtimeEngine {
    /// Creates an engine with the built-in chat handlers.
    ///
    /// Chat messages are handed to `sink` after broadcast, when one is given.
    pub fn new(config: RealtimeConfig, sink: Option<Arc<dyn MessageSink>>) -> Self {
        Self::with_router(config, EventRouter::with_defaults(sink))
    }

    /// Creates an engine around a custom router.
    pub fn with_router(config: RealtimeConfig, router: EventRouter) -> Self {
        info!(
            handlers = ?router.registered_types(),
            ping_interval = ?config.ping_interval(),
            pong_wait = ?config.pong_wait(),
            max_frame_bytes = config.max_frame_bytes,
            "Real-time engine initialized"
        );

        let connections = Arc::new(ConnectionManager::new(config, Arc::new(router)));
        let metrics = Arc::clone(connections.metrics());

        Self {
            connections,
            metrics,
        }
    }

    /// Initiates a graceful shutdown of the real-time engine.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        info!("Shutting down real-time engine");

        // Close all connections; each outbound loop sends a close frame
        self.connections.close_all();

        info!("Real-time engine shut down");
        Ok(())
    }
}
