//! Token revocation storage.

mod blacklist;

pub use blacklist::{RedisRevocationStore, REVOKED_TOKEN_PREFIX};
