//! Gateway server setup
//!
//! Routes, dependency wiring and the listener loop.

mod error;
mod handler;
mod pages;
mod state;

pub use error::AdmissionError;
pub use handler::{chat_socket_handler, AdmissionParams};
pub use pages::chat_page;
pub use state::GatewayState;

use crate::auth::AuthGate;
use crate::hub::Hub;
use axum::{extract::State, routing::get, Router};
use chat_cache::{RedisPool, RedisRevocationStore};
use chat_common::{AppConfig, AppError, JwtService};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/ws/chat", get(chat_socket_handler))
        .route("/chat", get(chat_page))
        .route("/health", get(health_check))
}

/// Health check endpoint
async fn health_check(State(state): State<GatewayState>) -> &'static str {
    let connections = state.hub().connection_count().await;
    tracing::debug!(connections, "Health check");
    "OK"
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize all dependencies, start the hub and create `GatewayState`
///
/// Returns the hub loop's task alongside the state.
pub async fn create_gateway_state(
    config: &AppConfig,
) -> Result<(GatewayState, JoinHandle<()>), AppError> {
    // Create database pool
    tracing::info!("Preparing PostgreSQL pool...");
    let db_config = chat_db::DatabaseConfig::from(&config.database);
    let pool = chat_db::create_pool(&db_config).map_err(|e| AppError::Database(e.to_string()))?;
    let directory = Arc::new(chat_db::PgUserDirectory::new(pool));

    // Create Redis pool
    tracing::info!("Connecting to Redis...");
    let redis_pool =
        RedisPool::from_config(&config.redis).map_err(|e| AppError::Cache(e.to_string()))?;
    match redis_pool.health_check().await {
        Ok(()) => tracing::info!("Redis connection established"),
        // Admission reports the outage per request until Redis comes back
        Err(e) => tracing::warn!(error = %e, "Redis not reachable yet"),
    }
    let revocations = Arc::new(RedisRevocationStore::new(redis_pool));

    // Create admission gate
    let gate = AuthGate::new(
        JwtService::new(&config.jwt.secret),
        config.app.name.clone(),
        revocations,
    );

    let (hub, hub_task) = Hub::start(&config.hub);

    let state = GatewayState::new(
        hub,
        gate,
        directory,
        config.websocket.clone(),
        config.pages.clone(),
    );

    Ok((state, hub_task))
}

/// Serve `app` on `listener` until `shutdown` resolves
pub async fn run_server(
    app: Router,
    listener: TcpListener,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), AppError> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Gateway listening on ws://{}/ws/chat", addr);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.gateway.address();

    // Create gateway state
    let (state, hub_task) = create_gateway_state(&config).await?;
    let hub = state.hub().clone();

    // Build application
    let app = create_app(state);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    // Run server
    run_server(app, listener, shutdown_signal()).await?;

    // Close every remaining connection before exiting
    hub.shutdown().await;
    if let Err(e) = hub_task.await {
        tracing::error!(error = %e, "Hub task failed");
    }

    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
