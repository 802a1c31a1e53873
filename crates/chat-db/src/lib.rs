//! # chat-db
//!
//! PostgreSQL access for the gateway via SQLx.
//!
//! The gateway never writes user profiles; it only resolves the display name
//! of a connecting user.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chat_db::{create_pool, DatabaseConfig, PgUserDirectory};
//! use chat_core::UserDirectory;
//!
//! let pool = create_pool(&DatabaseConfig::default())?;
//! let directory = PgUserDirectory::new(pool);
//! let name = directory.display_name(user_id).await?;
//! ```

pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, DatabaseConfig, PgPool};
pub use repositories::PgUserDirectory;
