//! Connection management
//!
//! Identity, outbound queue and liveness of each chat participant.

mod connection;

pub use connection::{Connection, ConnectionId, Identity, Mailbox};
