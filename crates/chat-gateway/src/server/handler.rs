//! WebSocket admission handler
//!
//! Checks the token and the user before upgrading, then hands the socket to a
//! pump. Nothing touches the hub until every check has passed.

use crate::connection::{Connection, Identity};
use crate::protocol::join_notice;
use crate::pump;
use crate::server::{AdmissionError, GatewayState};
use axum::{
    extract::{ws::WebSocket, Query, State, WebSocketUpgrade},
    response::{IntoResponse, Response},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chat_core::Snowflake;
use serde::Deserialize;

/// Query string of an admission request
#[derive(Debug, Default, Deserialize)]
pub struct AdmissionParams {
    pub token: Option<String>,
    pub user_id: Option<String>,
}

/// `GET /ws/chat?token=…&user_id=…`
pub async fn chat_socket_handler(
    State(state): State<GatewayState>,
    Query(params): Query<AdmissionParams>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    ws: Option<WebSocketUpgrade>,
) -> Result<Response, AdmissionError> {
    // The query parameter wins over the header
    let token = params
        .token
        .filter(|t| !t.is_empty())
        .or_else(|| bearer.map(|TypedHeader(Authorization(b))| b.token().to_string()))
        .unwrap_or_default();

    let claims = state.gate().validate(&token).await?;

    let user_id: Snowflake = params
        .user_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or(AdmissionError::MissingUserId)?
        .parse()?;

    let display_name = state
        .directory()
        .display_name(user_id)
        .await
        .map_err(AdmissionError::DirectoryUnavailable)?
        .ok_or(AdmissionError::UnknownUser(user_id))?;

    let ws = ws.ok_or(AdmissionError::UpgradeRequired)?;

    tracing::debug!(
        user_id = %user_id,
        account = %claims.account,
        "Admission granted"
    );

    let identity = Identity::new(user_id, display_name);
    let response = ws
        .max_message_size(state.websocket().max_message_size)
        .on_upgrade(move |socket| serve_connection(state, socket, identity));

    Ok(response.into_response())
}

/// Register an upgraded socket, announce it and pump it until it closes
async fn serve_connection(state: GatewayState, socket: WebSocket, identity: Identity) {
    let config = state.websocket().clone();
    let hub = state.hub().clone();
    let name = identity.display_name.clone();
    let (connection, mailbox) = Connection::open(identity, config.send_buffer);

    tracing::info!(
        connection_id = %connection.id(),
        user_id = %connection.identity().user_id,
        "WebSocket connection established"
    );

    hub.register(connection).await;
    hub.broadcast(join_notice(&name)).await;

    pump::run(socket, hub, mailbox, config).await;
}
