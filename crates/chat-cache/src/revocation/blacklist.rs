//! Revoked admission tokens in Redis.
//!
//! A token is revoked as long as `jwt:blacklist:<token>` exists. Entries are written
//! by the account service on logout with a TTL matching the token's remaining
//! lifetime; the gateway itself only reads them.

use async_trait::async_trait;
use chat_core::{RepoResult, RevocationStore};

use crate::pool::{RedisPool, RedisResult};

/// Key prefix for revoked tokens
pub const REVOKED_TOKEN_PREFIX: &str = "jwt:blacklist:";

/// Redis-backed revocation list
#[derive(Clone, Debug)]
pub struct RedisRevocationStore {
    pool: RedisPool,
}

impl RedisRevocationStore {
    /// Create a new revocation store
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Generate Redis key for a token
    fn key(token: &str) -> String {
        format!("{REVOKED_TOKEN_PREFIX}{token}")
    }

    /// Mark a token revoked for `ttl_seconds`
    pub async fn revoke(&self, token: &str, ttl_seconds: u64) -> RedisResult<()> {
        self.pool.set(&Self::key(token), &true, Some(ttl_seconds)).await?;

        tracing::debug!(ttl_seconds, "Token added to revocation list");

        Ok(())
    }

    /// Lift a revocation
    pub async fn reinstate(&self, token: &str) -> RedisResult<bool> {
        self.pool.delete(&Self::key(token)).await
    }
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn is_revoked(&self, token: &str) -> RepoResult<bool> {
        self.pool.exists(&Self::key(token)).await.map_err(|e| {
            tracing::warn!(error = %e, "Revocation lookup failed");
            e.into()
        })
    }
}
