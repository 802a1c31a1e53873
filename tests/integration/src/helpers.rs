//! Test helpers for integration tests
//!
//! Provides a test server bound to an ephemeral port, HTTP helpers, and a thin
//! WebSocket client for driving chat sessions.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use chat_common::{JwtService, PagesConfig, WebSocketConfig};
use chat_gateway::{create_app, AuthGate, GatewayState, Hub};
use futures_util::{SinkExt, StreamExt};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::fixtures::{InMemoryDirectory, InMemoryRevocations, TEST_ISSUER, TEST_SECRET};

/// How long a test waits for any single frame
pub const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Client side of a chat connection
pub type ChatSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub hub: Hub,
    pub directory: Arc<InMemoryDirectory>,
    pub revocations: Arc<InMemoryRevocations>,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server with default limits
    pub async fn start() -> Result<Self> {
        Self::start_with(WebSocketConfig::default(), PagesConfig::default()).await
    }

    /// Start a test server with custom websocket limits and pages
    pub async fn start_with(websocket: WebSocketConfig, pages: PagesConfig) -> Result<Self> {
        let directory = Arc::new(InMemoryDirectory::default());
        let revocations = Arc::new(InMemoryRevocations::default());

        let (hub, _) = Hub::start(&chat_common::HubConfig::default());
        let gate = AuthGate::new(JwtService::new(TEST_SECRET), TEST_ISSUER, revocations.clone());
        let state = GatewayState::new(hub.clone(), gate, directory.clone(), websocket, pages);

        // Build application
        let app = create_app(state);

        // Bind to an ephemeral port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        // Spawn server task
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        // Create HTTP client
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            hub,
            directory,
            revocations,
            _handle: handle,
        })
    }

    /// Start a server whose `/chat` page is `path`
    pub async fn with_chat_page(path: PathBuf) -> Result<Self> {
        Self::start_with(WebSocketConfig::default(), PagesConfig { chat_page: path }).await
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Admission URL for a token and user id
    pub fn chat_url(&self, token: &str, user_id: impl std::fmt::Display) -> String {
        format!("ws://{}/ws/chat?token={token}&user_id={user_id}", self.addr)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Make a GET request with auth token
    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).bearer_auth(token).send().await?)
    }

    /// Open a chat connection
    pub async fn connect(&self, token: &str, user_id: impl std::fmt::Display) -> Result<ChatSocket> {
        let (socket, _) = connect_async(self.chat_url(token, user_id)).await?;
        Ok(socket)
    }

    /// Wait until the hub holds exactly `expected` connections
    pub async fn wait_for_connections(&self, expected: usize) -> Result<()> {
        let deadline = tokio::time::Instant::now() + FRAME_TIMEOUT;
        loop {
            let count = self.hub.connection_count().await;
            if count == expected {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                bail!("Expected {expected} connections, hub has {count}");
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

/// Next text frame from the server, skipping keepalive traffic
pub async fn next_text(socket: &mut ChatSocket) -> Result<String> {
    loop {
        let frame = tokio::time::timeout(FRAME_TIMEOUT, socket.next()).await;
        match frame {
            Err(_) => bail!("No frame within {FRAME_TIMEOUT:?}"),
            Ok(None) => bail!("Connection ended"),
            Ok(Some(Err(e))) => bail!("Connection failed: {e}"),
            Ok(Some(Ok(Message::Text(text)))) => return Ok(text),
            Ok(Some(Ok(Message::Ping(_) | Message::Pong(_)))) => {}
            Ok(Some(Ok(other))) => bail!("Unexpected frame: {other:?}"),
        }
    }
}

/// Wait until the server closes the connection
pub async fn expect_closed(socket: &mut ChatSocket) -> Result<()> {
    loop {
        match tokio::time::timeout(FRAME_TIMEOUT, socket.next()).await {
            Err(_) => bail!("Connection still open after {FRAME_TIMEOUT:?}"),
            Ok(None | Some(Ok(Message::Close(_)) | Err(_))) => return Ok(()),
            Ok(Some(Ok(_))) => {}
        }
    }
}

/// Send one chat message
pub async fn send_text(socket: &mut ChatSocket, text: &str) -> Result<()> {
    socket.send(Message::Text(text.to_string())).await?;
    Ok(())
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}
