//! Connection hub
//!
//! Registry of live connections and fan-out of chat events.

mod hub;

pub use hub::{Hub, HubCommand};
