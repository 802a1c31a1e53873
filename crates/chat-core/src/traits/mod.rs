//! Ports implemented by the infrastructure crates

mod ports;

pub use ports::{RepoResult, RevocationStore, UserDirectory};
