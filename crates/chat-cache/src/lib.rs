//! # chat-cache
//!
//! Redis layer for the gateway.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Revocation**: Blacklist of admission tokens invalidated before expiry
//!
//! ## Example
//!
//! ```ignore
//! use chat_cache::{RedisPool, RedisPoolConfig, RedisRevocationStore};
//! use chat_core::RevocationStore;
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let revocations = RedisRevocationStore::new(pool);
//!
//! if revocations.is_revoked(token).await? {
//!     // reject the connection
//! }
//! ```

pub mod pool;
pub mod revocation;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};

// Re-export revocation types
pub use revocation::{RedisRevocationStore, REVOKED_TOKEN_PREFIX};
