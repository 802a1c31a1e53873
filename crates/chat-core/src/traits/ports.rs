//! Ports for the gateway's external collaborators
//!
//! The gateway only ever reads through these; writes (account creation, logout)
//! belong to other services. Infrastructure crates provide the implementations.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Directory
// ============================================================================

/// Read-only lookup of user profiles
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve the display name shown in chat lines for a user
    ///
    /// Returns `Ok(None)` when no such (non-deleted) user exists.
    async fn display_name(&self, user_id: Snowflake) -> RepoResult<Option<String>>;
}

// ============================================================================
// Revocation Store
// ============================================================================

/// Store of admission tokens invalidated before their natural expiry
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Whether the token has been revoked
    ///
    /// Presence of a record is all that matters; an `Err` means the store could not
    /// answer and callers must fail closed.
    async fn is_revoked(&self, token: &str) -> RepoResult<bool>;
}
