//! JWT utilities for connection admission
//!
//! Admission tokens are HS256-signed by the account service and carry the account,
//! its role, the issuing service and an expiry. Decoding here only verifies the
//! signature and shape; expiry and issuer are policy checks made by the caller so
//! that each failure can be reported distinctly.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account identifier
    #[serde(default)]
    pub account: String,
    /// Account role
    #[serde(default)]
    pub role: String,
    /// Issuing service
    #[serde(default)]
    pub iss: String,
    /// Expiration time (Unix timestamp); absent means already expired
    #[serde(default)]
    pub exp: i64,
    /// Issued at (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    /// Build claims valid for `ttl` from now
    #[must_use]
    pub fn new(
        account: impl Into<String>,
        role: impl Into<String>,
        issuer: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            account: account.into(),
            role: role.into(),
            iss: issuer.into(),
            exp: (now + ttl).timestamp(),
            iat: Some(now.timestamp()),
        }
    }

    /// Whether the token is expired at `now` (Unix seconds)
    ///
    /// The expiry instant itself already counts as expired.
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }

    /// Check whether the token was issued by `issuer`
    #[must_use]
    pub fn is_issued_by(&self, issuer: &str) -> bool {
        self.iss == issuer
    }
}

/// JWT service for encoding and decoding admission tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    /// Create a new JWT service with the given shared secret
    #[must_use]
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry and issuer are checked by the admission gate
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign a set of claims
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn encode_claims(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to encode JWT: {e}")))
    }

    /// Issue a token for an account, valid for `ttl`
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn issue(
        &self,
        account: &str,
        role: &str,
        issuer: &str,
        ttl: Duration,
    ) -> Result<String, AppError> {
        self.encode_claims(&Claims::new(account, role, issuer, ttl))
    }

    /// Verify the signature and decode the claims
    ///
    /// # Errors
    /// Returns `AppError::InvalidToken` if the token is malformed, uses another
    /// algorithm, or was signed with a different key
    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "JWT rejected");
                AppError::InvalidToken
            })
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService").finish_non_exhaustive()
    }
}
