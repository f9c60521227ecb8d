//! Integration tests for WebSocket connection and messaging.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use futures::SinkExt;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message};

use roomchat_core::config::AppConfig;
use roomchat_core::traits::OpenRoomGate;
use roomchat_realtime::message::NewMessageEvent;

use helpers::{
    ALLOWED_ORIGIN, ChannelSink, PickyGate, TestApp, assert_no_event, expect_closed, next_event,
    send_chat, send_event,
};

const QUIET: Duration = Duration::from_millis(300);

fn new_message(event: serde_json::Value) -> NewMessageEvent {
    assert_eq!(event["type"], "new_message");
    serde_json::from_value(event["payload"].clone()).expect("new_message payload")
}

fn assert_forbidden(result: Result<helpers::WsClient, tungstenite::Error>) {
    match result {
        Err(tungstenite::Error::Http(response)) => {
            assert_eq!(response.status().as_u16(), StatusCode::FORBIDDEN.as_u16())
        }
        Err(other) => panic!("expected HTTP 403, got {other}"),
        Ok(_) => panic!("expected HTTP 403, handshake succeeded"),
    }
}

#[tokio::test]
async fn test_room_broadcast_scenario() {
    let app = TestApp::new().await;
    let mut a = app.connect("/ws/general").await;
    let mut b = app.connect("/ws/general").await;
    let mut c = app.connect("/ws/other").await;
    app.wait_for_connections(3).await;

    send_chat(&mut a, "alice", "hi").await;

    for ws in [&mut a, &mut b] {
        let payload = new_message(next_event(ws).await);
        assert_eq!(payload.message, "hi");
        assert_eq!(payload.from, "alice");
    }
    assert_no_event(&mut c, QUIET).await;

    app.shutdown().await;
}

#[tokio::test]
async fn test_change_room_stops_delivery_from_old_room() {
    let app = TestApp::new().await;
    let mut a = app.connect("/ws/general").await;
    let mut b = app.connect("/ws/general").await;
    app.wait_for_connections(2).await;

    send_chat(&mut a, "alice", "before").await;
    next_event(&mut a).await;
    next_event(&mut b).await;

    send_event(&mut a, "change_room", serde_json::json!({ "name": "other" })).await;
    // frames on one connection are handled in order, so this echo proves the move
    send_chat(&mut a, "alice", "in other").await;
    assert_eq!(new_message(next_event(&mut a).await).message, "in other");

    send_chat(&mut b, "bob", "still general").await;
    assert_eq!(new_message(next_event(&mut b).await).message, "still general");
    assert_no_event(&mut a, QUIET).await;

    app.shutdown().await;
}

#[tokio::test]
async fn test_roomless_connection_joins_with_change_room() {
    let app = TestApp::new().await;
    let mut lobby = app.connect("/ws").await;
    let mut member = app.connect("/ws/general").await;
    app.wait_for_connections(2).await;

    send_event(&mut lobby, "change_room", serde_json::json!({ "name": "general" })).await;
    send_chat(&mut lobby, "dana", "joined").await;

    assert_eq!(new_message(next_event(&mut lobby).await).from, "dana");
    assert_eq!(new_message(next_event(&mut member).await).from, "dana");

    app.shutdown().await;
}

#[tokio::test]
async fn test_unknown_event_keeps_connection_open() {
    let app = TestApp::new().await;
    let mut a = app.connect("/ws/general").await;

    send_event(&mut a, "typing", serde_json::json!({})).await;
    send_event(&mut a, "send_message", serde_json::json!({ "text": 1 })).await;
    send_chat(&mut a, "alice", "still here").await;

    assert_eq!(new_message(next_event(&mut a).await).message, "still here");
    assert_eq!(app.connection_count(), 1);

    app.shutdown().await;
}

#[tokio::test]
async fn test_oversized_frame_closes_only_sender() {
    let app = TestApp::new().await;
    let mut a = app.connect("/ws/general").await;
    let mut b = app.connect("/ws/general").await;
    app.wait_for_connections(2).await;

    let _ = a.send(Message::text("x".repeat(513))).await;
    expect_closed(&mut a).await;
    app.wait_for_connections(1).await;

    send_chat(&mut b, "bob", "ok").await;
    assert_eq!(new_message(next_event(&mut b).await).from, "bob");

    app.shutdown().await;
}

#[tokio::test]
async fn test_frame_at_limit_is_accepted() {
    let app = TestApp::new().await;
    let mut a = app.connect("/ws/general").await;

    let prefix = r#"{"type":"send_message","payload":{"message":""#;
    let suffix = r#"","from":"a"}}"#;
    let body_len = 512 - prefix.len() - suffix.len();
    let frame = format!("{prefix}{}{suffix}", "x".repeat(body_len));
    assert_eq!(frame.len(), 512);

    a.send(Message::text(frame)).await.unwrap();
    let payload = new_message(next_event(&mut a).await);
    assert_eq!(payload.message.len(), body_len);

    app.shutdown().await;
}

#[tokio::test]
async fn test_disallowed_origin_is_refused() {
    let app = TestApp::new().await;

    assert_forbidden(app.try_connect("/ws/general", Some("http://evil.example")).await);
    assert_forbidden(app.try_connect("/ws", Some("http://evil.example")).await);
    assert_eq!(app.connection_count(), 0);

    // non-browser clients send no Origin
    let _ws = app.try_connect("/ws/general", None).await.unwrap();
    app.wait_for_connections(1).await;

    app.shutdown().await;
}

#[tokio::test]
async fn test_room_gate_refusal_is_forbidden() {
    let gate = Arc::new(PickyGate {
        refused: "secret",
        broken: "flaky",
    });
    let app = TestApp::with(AppConfig::default(), None, gate).await;

    assert_forbidden(app.try_connect("/ws/secret", Some(ALLOWED_ORIGIN)).await);
    assert_forbidden(app.try_connect("/ws/flaky", Some(ALLOWED_ORIGIN)).await);
    assert_eq!(app.connection_count(), 0);

    let _ws = app.connect("/ws/general").await;
    app.wait_for_connections(1).await;

    app.shutdown().await;
}

#[tokio::test]
async fn test_sink_receives_broadcast_messages() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let app = TestApp::with(
        AppConfig::default(),
        Some(Arc::new(ChannelSink(tx))),
        Arc::new(OpenRoomGate),
    )
    .await;
    let mut a = app.connect("/ws/general").await;

    send_chat(&mut a, "alice", "keep me").await;
    let delivered = new_message(next_event(&mut a).await);

    let stored = tokio::time::timeout(helpers::RECV_TIMEOUT, rx.recv())
        .await
        .expect("sink was not called")
        .expect("sink channel closed");
    assert_eq!(stored.room, "general");
    assert_eq!(stored.from, "alice");
    assert_eq!(stored.message, "keep me");
    assert_eq!(stored.sent, delivered.sent);

    app.shutdown().await;
}

#[tokio::test]
async fn test_health_reports_live_registry() {
    let app = TestApp::new().await;
    let _a = app.connect("/ws/general").await;
    let _b = app.connect("/ws/other").await;
    let _c = app.connect("/ws").await;
    app.wait_for_connections(3).await;

    let (status, body) = app.get_json("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["connections"], 3);
    assert_eq!(body["rooms"], 2);
    assert_eq!(body["metrics"]["connections_active"], 3);

    app.shutdown().await;
}

#[tokio::test]
async fn test_client_disconnect_unregisters() {
    let app = TestApp::new().await;
    let mut a = app.connect("/ws/general").await;
    app.wait_for_connections(1).await;

    a.close(None).await.unwrap();
    app.wait_for_connections(0).await;

    app.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_closes_clients() {
    let app = TestApp::new().await;
    let mut a = app.connect("/ws/general").await;
    app.wait_for_connections(1).await;

    let state = app.state.clone();
    app.shutdown().await;

    expect_closed(&mut a).await;
    assert_eq!(state.realtime.connections.connection_count(), 0);
}
