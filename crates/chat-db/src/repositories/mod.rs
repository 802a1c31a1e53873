//! Repository implementations

mod error;
mod user_directory;

pub use user_directory::PgUserDirectory;
