//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

use roomchat_api::AppState;
use roomchat_core::config::AppConfig;
use roomchat_core::{AppError, AppResult};
use roomchat_core::traits::{MessageSink, OpenRoomGate, RoomGate};
use roomchat_core::types::ChatMessage;

/// Origin the default configuration allows.
pub const ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// How long to wait for a frame that should arrive.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Client side of a WebSocket connection.
pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A running server bound to an ephemeral port.
pub struct TestApp {
    /// Bound address
    pub addr: SocketAddr,
    /// Shared state (inspect the registry directly)
    pub state: AppState,
    shutdown: Option<oneshot::Sender<()>>,
    server: JoinHandle<Result<(), AppError>>,
}

impl TestApp {
    /// Server with default configuration, no sink, every room admitted.
    pub async fn new() -> Self {
        Self::with(AppConfig::default(), None, Arc::new(OpenRoomGate)).await
    }

    /// Server with explicit collaborators.
    pub async fn with(
        config: AppConfig,
        sink: Option<Arc<dyn MessageSink>>,
        gate: Arc<dyn RoomGate>,
    ) -> Self {
        let state = AppState::new(config, sink, gate);
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(roomchat_api::serve(listener, state.clone(), async move {
            let _ = shutdown_rx.await;
        }));

        Self {
            addr,
            state,
            shutdown: Some(shutdown_tx),
            server,
        }
    }

    /// `ws://` URL for `path`.
    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://{}{}", self.addr, path)
    }

    /// Connect with the allowed origin, panicking on failure.
    pub async fn connect(&self, path: &str) -> WsClient {
        self.try_connect(path, Some(ALLOWED_ORIGIN))
            .await
            .expect("WebSocket handshake failed")
    }

    /// Connect with an optional `Origin` header.
    pub async fn try_connect(
        &self,
        path: &str,
        origin: Option<&str>,
    ) -> Result<WsClient, tungstenite::Error> {
        let mut request = self.ws_url(path).into_client_request()?;
        if let Some(origin) = origin {
            request.headers_mut().insert(
                "Origin",
                HeaderValue::from_str(origin).expect("Invalid origin header"),
            );
        }
        let (ws, _response) = tokio_tungstenite::connect_async(request).await?;
        Ok(ws)
    }

    /// GET a JSON endpoint through the router.
    pub async fn get_json(&self, path: &str) -> (StatusCode, Value) {
        let response = roomchat_api::build_app(self.state.clone())
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    /// Live connections in the registry.
    pub fn connection_count(&self) -> usize {
        self.state.realtime.connections.connection_count()
    }

    /// Wait until the registry holds `expected` connections.
    pub async fn wait_for_connections(&self, expected: usize) {
        tokio::time::timeout(RECV_TIMEOUT, async {
            while self.connection_count() != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| {
            panic!(
                "expected {expected} connections, registry has {}",
                self.connection_count()
            )
        });
    }

    /// Trigger graceful shutdown and wait for the server to stop.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        tokio::time::timeout(RECV_TIMEOUT, &mut self.server)
            .await
            .expect("Server did not stop")
            .expect("Server task panicked")
            .expect("Server returned an error");
    }
}

/// Send an event envelope.
pub async fn send_event(ws: &mut WsClient, event_type: &str, payload: Value) {
    let frame = serde_json::json!({ "type": event_type, "payload": payload }).to_string();
    ws.send(Message::text(frame)).await.expect("Failed to send frame");
}

/// Send a `send_message` event.
pub async fn send_chat(ws: &mut WsClient, from: &str, message: &str) {
    send_event(
        ws,
        "send_message",
        serde_json::json!({ "message": message, "from": from }),
    )
    .await;
}

/// Next event envelope from the server, skipping control frames.
pub async fn next_event(ws: &mut WsClient) -> Value {
    tokio::time::timeout(RECV_TIMEOUT, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str::<Value>(text.as_str())
                        .expect("Server sent invalid JSON");
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                other => panic!("expected text frame, got {other:?}"),
            }
        }
    })
    .await
    .expect("Timed out waiting for an event")
}

/// Assert that no event arrives within `window`.
pub async fn assert_no_event(ws: &mut WsClient, window: Duration) {
    let result = tokio::time::timeout(window, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                other => return other,
            }
        }
    })
    .await;
    if let Ok(frame) = result {
        panic!("expected silence, got {frame:?}");
    }
}

/// Wait for the server to end the connection (close frame, EOF, or error).
pub async fn expect_closed(ws: &mut WsClient) {
    tokio::time::timeout(RECV_TIMEOUT, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                Some(Ok(Message::Text(text))) => panic!("unexpected event after close: {text}"),
                _ => return,
            }
        }
    })
    .await
    .expect("Server did not close the connection");
}

/// Sink that forwards every persisted message to a channel.
#[derive(Debug)]
pub struct ChannelSink(pub mpsc::UnboundedSender<ChatMessage>);

#[async_trait]
impl MessageSink for ChannelSink {
    async fn persist(&self, message: ChatMessage) -> AppResult<()> {
        self.0
            .send(message)
            .map_err(|_| AppError::service_unavailable("sink closed"))
    }
}

/// Gate that refuses one room and fails on another.
#[derive(Debug)]
pub struct PickyGate {
    /// Room that is refused
    pub refused: &'static str,
    /// Room whose check errors
    pub broken: &'static str,
}

#[async_trait]
impl RoomGate for PickyGate {
    async fn admit(&self, room_code: &str) -> AppResult<bool> {
        if room_code == self.broken {
            return Err(AppError::service_unavailable("membership service down"));
        }
        Ok(room_code != self.refused)
    }
}
