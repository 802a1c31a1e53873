//! # chat-core
//!
//! Domain layer containing value objects, domain errors, and the ports through which
//! the gateway reaches its external collaborators (identity lookup, token revocation).
//! This crate has zero dependencies on infrastructure (database, cache, web framework).

pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use error::DomainError;
pub use traits::{RepoResult, RevocationStore, UserDirectory};
pub use value_objects::{Snowflake, SnowflakeParseError};
