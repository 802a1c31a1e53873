//! Static pages

use crate::server::GatewayState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

/// `GET /chat`: the browser chat client
pub async fn chat_page(State(state): State<GatewayState>) -> Response {
    let path = &state.pages().chat_page;

    match tokio::fs::read_to_string(path).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Chat page unavailable");
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}
