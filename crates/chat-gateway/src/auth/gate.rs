//! Token admission check
//!
//! Decides whether a presented token may open a chat connection. The checks run
//! in a fixed order and the first failure wins: presence, revocation, signature,
//! expiry, issuer.

use super::AuthError;
use chat_common::{Claims, JwtService};
use chat_core::RevocationStore;
use chrono::Utc;
use std::sync::Arc;

/// Validates admission tokens
#[derive(Clone)]
pub struct AuthGate {
    jwt: JwtService,
    issuer: String,
    revocations: Arc<dyn RevocationStore>,
}

impl AuthGate {
    /// Create a gate accepting tokens signed with `jwt` and issued by `issuer`
    pub fn new(
        jwt: JwtService,
        issuer: impl Into<String>,
        revocations: Arc<dyn RevocationStore>,
    ) -> Self {
        Self {
            jwt,
            issuer: issuer.into(),
            revocations,
        }
    }

    /// Validate a token against the current time
    pub async fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_at(token, Utc::now().timestamp()).await
    }

    /// Validate a token as of `now` (Unix seconds)
    pub async fn validate_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        match self.revocations.is_revoked(token).await {
            Ok(false) => {}
            Ok(true) => return Err(AuthError::TokenRevoked),
            Err(e) => {
                tracing::warn!(error = %e, "Revocation store unavailable");
                return Err(AuthError::Unavailable(e));
            }
        }

        let claims = self
            .jwt
            .decode_token(token)
            .map_err(|_| AuthError::MalformedToken)?;

        if claims.is_expired_at(now) {
            return Err(AuthError::TokenExpired);
        }

        if !claims.is_issued_by(&self.issuer) {
            tracing::debug!(issuer = %claims.iss, expected = %self.issuer, "Token issuer rejected");
            return Err(AuthError::IssuerMismatch);
        }

        Ok(claims)
    }
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}
