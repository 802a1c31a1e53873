//! Gateway Integration Tests
//!
//! Each test starts the real router on an ephemeral port with in-memory user
//! and revocation stores, then talks to it over HTTP and WebSocket.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use std::time::Duration;

use chat_common::{ErrorResponse, PagesConfig, WebSocketConfig};
use futures_util::SinkExt;
use integration_tests::{
    assert_json, assert_status, expect_closed, expired_token, fixtures::*, foreign_issuer_token,
    next_text, send_text, TestServer,
};
use reqwest::StatusCode;
use tokio_tungstenite::tungstenite::{self, Message};

fn is_chat_line(line: &str, sender: &str, content: &str) -> bool {
    let Some((stamp, rest)) = line.strip_prefix('[').and_then(|l| l.split_once("] ")) else {
        return false;
    };
    chrono::NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S").is_ok()
        && rest == format!("{sender}: {content}")
}

// ============================================================================
// HTTP Routes
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_chat_page_served() {
    let path = std::env::temp_dir().join(format!("gateway-chat-{}.html", unique_user_id()));
    std::fs::write(&path, "<!DOCTYPE html><title>chat</title>").unwrap();

    let server = TestServer::with_chat_page(path.clone()).await.unwrap();
    let response = server.get("/chat").await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("<title>chat</title>"));

    let response = server
        .client
        .post(format!("{}/chat", server.base_url()))
        .send()
        .await
        .unwrap();
    assert_status(response, StatusCode::METHOD_NOT_ALLOWED).await.unwrap();

    std::fs::remove_file(path).ok();
}

#[tokio::test]
async fn test_chat_page_missing() {
    let server = TestServer::start_with(
        WebSocketConfig::default(),
        PagesConfig {
            chat_page: "definitely-missing.html".into(),
        },
    )
    .await
    .unwrap();

    let response = server.get("/chat").await.unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

// ============================================================================
// Admission
// ============================================================================

async fn admission_error(server: &TestServer, query: &str, status: StatusCode) -> ErrorResponse {
    let response = server.get(&format!("/ws/chat?{query}")).await.unwrap();
    assert_json(response, status).await.unwrap()
}

#[tokio::test]
async fn test_token_rejections() {
    let server = TestServer::start().await.unwrap();
    let alice = server.directory.add("Alice");

    let cases = [
        (format!("user_id={alice}"), "MISSING_TOKEN"),
        (format!("token=&user_id={alice}"), "MISSING_TOKEN"),
        (format!("token=abc.def.ghi&user_id={alice}"), "MALFORMED_TOKEN"),
        (format!("token={}&user_id={alice}", expired_token()), "TOKEN_EXPIRED"),
        (
            format!("token={}&user_id={alice}", foreign_issuer_token()),
            "ISSUER_MISMATCH",
        ),
    ];

    for (query, code) in cases {
        let error = admission_error(&server, &query, StatusCode::UNAUTHORIZED).await;
        assert_eq!(error.code, code, "query: {query}");
    }

    assert_eq!(server.hub.connection_count().await, 0);
}

#[tokio::test]
async fn test_revoked_token_rejected() {
    let server = TestServer::start().await.unwrap();
    let alice = server.directory.add("Alice");
    let token = valid_token();
    server.revocations.revoke(&token);
    let other = valid_token();
    assert_ne!(token, other);

    let error = admission_error(
        &server,
        &format!("token={token}&user_id={alice}"),
        StatusCode::UNAUTHORIZED,
    )
    .await;
    assert_eq!(error.code, "TOKEN_REVOKED");

    // A different token for the same user still gets in
    let mut socket = server.connect(&other, alice).await.unwrap();
    assert_eq!(next_text(&mut socket).await.unwrap(), "Alice has joined the chat");
}

#[tokio::test]
async fn test_store_outages_are_unavailable() {
    let server = TestServer::start().await.unwrap();
    let alice = server.directory.add("Alice");
    let query = format!("token={}&user_id={alice}", valid_token());

    server.revocations.set_unavailable(true);
    let error = admission_error(&server, &query, StatusCode::SERVICE_UNAVAILABLE).await;
    assert_eq!(error.code, "AUTH_UNAVAILABLE");
    server.revocations.set_unavailable(false);

    server.directory.set_unavailable(true);
    let error = admission_error(&server, &query, StatusCode::SERVICE_UNAVAILABLE).await;
    assert_eq!(error.code, "DIRECTORY_UNAVAILABLE");
}

#[tokio::test]
async fn test_user_id_rejections() {
    let server = TestServer::start().await.unwrap();
    let token = valid_token();

    let error = admission_error(&server, &format!("token={token}"), StatusCode::BAD_REQUEST).await;
    assert_eq!(error.code, "MISSING_USER_ID");

    let error = admission_error(
        &server,
        &format!("token={token}&user_id=not-a-number"),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(error.code, "INVALID_USER_ID");

    let error = admission_error(
        &server,
        &format!("token={token}&user_id={}", unique_user_id()),
        StatusCode::NOT_FOUND,
    )
    .await;
    assert_eq!(error.code, "UNKNOWN_USER");
}

#[tokio::test]
async fn test_bearer_header_admission() {
    let server = TestServer::start().await.unwrap();
    let alice = server.directory.add("Alice");

    // Admitted, but a plain GET cannot be upgraded
    let response = server
        .get_auth(&format!("/ws/chat?user_id={alice}"), &valid_token())
        .await
        .unwrap();
    assert_status(response, StatusCode::UPGRADE_REQUIRED).await.unwrap();
}

#[tokio::test]
async fn test_rejected_handshake() {
    let server = TestServer::start().await.unwrap();
    let alice = server.directory.add("Alice");

    let Err(err) = server.connect(&expired_token(), alice).await else {
        panic!("handshake with an expired token succeeded");
    };
    match err.downcast_ref::<tungstenite::Error>() {
        Some(tungstenite::Error::Http(response)) => {
            assert_eq!(response.status().as_u16(), 401);
        }
        other => panic!("expected HTTP rejection, got {other:?}"),
    }

    assert_eq!(server.hub.connection_count().await, 0);
}

// ============================================================================
// Chat Sessions
// ============================================================================

#[tokio::test]
async fn test_join_chat_and_leave() {
    let server = TestServer::start().await.unwrap();
    let alice_id = server.directory.add("Alice");
    let bob_id = server.directory.add("Bob");

    let mut alice = server.connect(&valid_token(), alice_id).await.unwrap();
    assert_eq!(next_text(&mut alice).await.unwrap(), "Alice has joined the chat");

    let mut bob = server.connect(&valid_token(), bob_id).await.unwrap();
    assert_eq!(next_text(&mut bob).await.unwrap(), "Bob has joined the chat");
    assert_eq!(next_text(&mut alice).await.unwrap(), "Bob has joined the chat");
    server.wait_for_connections(2).await.unwrap();

    send_text(&mut alice, "  hello\nworld  ").await.unwrap();
    let line = next_text(&mut bob).await.unwrap();
    assert!(is_chat_line(&line, "Alice", "hello world"), "got {line:?}");
    let echo = next_text(&mut alice).await.unwrap();
    assert_eq!(echo, line);

    alice.close(None).await.unwrap();
    assert_eq!(next_text(&mut bob).await.unwrap(), "Alice has left the chat");
    server.wait_for_connections(1).await.unwrap();
}

#[tokio::test]
async fn test_late_joiner_misses_earlier_messages() {
    let server = TestServer::start().await.unwrap();
    let alice_id = server.directory.add("Alice");
    let bob_id = server.directory.add("Bob");

    let mut alice = server.connect(&valid_token(), alice_id).await.unwrap();
    next_text(&mut alice).await.unwrap();
    send_text(&mut alice, "before bob").await.unwrap();
    next_text(&mut alice).await.unwrap();

    let mut bob = server.connect(&valid_token(), bob_id).await.unwrap();
    assert_eq!(next_text(&mut bob).await.unwrap(), "Bob has joined the chat");
}

#[tokio::test]
async fn test_oversized_message_disconnects_sender() {
    let server = TestServer::start().await.unwrap();
    let alice_id = server.directory.add("Alice");
    let bob_id = server.directory.add("Bob");

    let mut alice = server.connect(&valid_token(), alice_id).await.unwrap();
    next_text(&mut alice).await.unwrap();
    let mut bob = server.connect(&valid_token(), bob_id).await.unwrap();
    next_text(&mut bob).await.unwrap();

    // Ignore the outcome: the server may already have dropped the socket
    let _ = alice.send(Message::Text("x".repeat(600))).await;

    assert_eq!(next_text(&mut bob).await.unwrap(), "Alice has left the chat");
    server.wait_for_connections(1).await.unwrap();
}

#[tokio::test]
async fn test_silent_client_is_dropped() {
    let pong_wait = Duration::from_millis(400);
    let websocket = WebSocketConfig {
        pong_wait,
        ping_period: Duration::from_millis(200),
        ..WebSocketConfig::default()
    };
    let server = TestServer::start_with(websocket, PagesConfig::default())
        .await
        .unwrap();
    let alice_id = server.directory.add("Alice");
    let bob_id = server.directory.add("Bob");

    // Bob keeps reading, so his client answers every ping
    let mut bob = server.connect(&valid_token(), bob_id).await.unwrap();
    next_text(&mut bob).await.unwrap();

    // Alice never reads after the handshake, so her pongs never go out
    let _alice = server.connect(&valid_token(), alice_id).await.unwrap();
    assert_eq!(next_text(&mut bob).await.unwrap(), "Alice has joined the chat");

    assert_eq!(next_text(&mut bob).await.unwrap(), "Alice has left the chat");
    server.wait_for_connections(1).await.unwrap();
}

#[tokio::test]
async fn test_hub_shutdown_closes_clients() {
    let server = TestServer::start().await.unwrap();
    let alice_id = server.directory.add("Alice");

    let mut alice = server.connect(&valid_token(), alice_id).await.unwrap();
    next_text(&mut alice).await.unwrap();

    server.hub.shutdown().await;

    expect_closed(&mut alice).await.unwrap();
}
