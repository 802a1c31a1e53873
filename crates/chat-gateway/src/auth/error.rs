//! Admission token errors

use chat_core::DomainError;
use thiserror::Error;

/// Why a token was refused
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing token")]
    MissingToken,

    #[error("Token has been revoked")]
    TokenRevoked,

    #[error("Malformed token")]
    MalformedToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token issuer not accepted")]
    IssuerMismatch,

    /// The revocation store could not be consulted
    #[error("Authentication temporarily unavailable")]
    Unavailable(#[source] DomainError),
}

impl AuthError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::MalformedToken => "MALFORMED_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::IssuerMismatch => "ISSUER_MISMATCH",
            Self::Unavailable(_) => "AUTH_UNAVAILABLE",
        }
    }

    /// Whether retrying later could succeed
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
