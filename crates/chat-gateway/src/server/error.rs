//! Admission errors
//!
//! Every way an upgrade request can be turned away before a connection exists.

use crate::auth::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chat_common::ErrorResponse;
use chat_core::{DomainError, Snowflake, SnowflakeParseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Missing user ID")]
    MissingUserId,

    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] SnowflakeParseError),

    #[error("User not found: {0}")]
    UnknownUser(Snowflake),

    #[error("User directory unavailable")]
    DirectoryUnavailable(#[source] DomainError),

    #[error("WebSocket upgrade required")]
    UpgradeRequired,
}

impl AdmissionError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Auth(e) if e.is_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::MissingUserId | Self::InvalidUserId(_) => StatusCode::BAD_REQUEST,
            Self::UnknownUser(_) => StatusCode::NOT_FOUND,
            Self::DirectoryUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::UpgradeRequired => StatusCode::UPGRADE_REQUIRED,
        }
    }

    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Auth(e) => e.error_code(),
            Self::MissingUserId => "MISSING_USER_ID",
            Self::InvalidUserId(_) => "INVALID_USER_ID",
            Self::UnknownUser(_) => "UNKNOWN_USER",
            Self::DirectoryUnavailable(_) => "DIRECTORY_UNAVAILABLE",
            Self::UpgradeRequired => "UPGRADE_REQUIRED",
        }
    }
}

impl IntoResponse for AdmissionError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = ?self, "Admission failed");
        } else {
            tracing::debug!(error = %self, "Admission refused");
        }

        let body = ErrorResponse::new(self.error_code(), self.to_string());
        (status, Json(body)).into_response()
    }
}
