//! # chat-gateway
//!
//! WebSocket chat gateway: a broadcast hub, one pump per connection, and a
//! token gate in front of the upgrade.

pub mod auth;
pub mod connection;
pub mod hub;
pub mod protocol;
pub mod pump;
pub mod server;

pub use auth::{AuthError, AuthGate};
pub use connection::{Connection, ConnectionId, Identity, Mailbox};
pub use hub::Hub;
pub use server::{create_app, create_gateway_state, run, run_server, AdmissionError, GatewayState};
