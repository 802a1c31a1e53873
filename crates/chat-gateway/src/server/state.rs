//! Gateway state
//!
//! Application state for the gateway server.

use crate::auth::AuthGate;
use crate::hub::Hub;
use chat_common::{PagesConfig, WebSocketConfig};
use chat_core::UserDirectory;
use std::sync::Arc;

/// Gateway application state
///
/// Holds all shared dependencies for the gateway server.
#[derive(Clone)]
pub struct GatewayState {
    /// Handle to the broadcast hub
    hub: Hub,
    /// Token admission
    gate: Arc<AuthGate>,
    /// Display-name lookup
    directory: Arc<dyn UserDirectory>,
    /// Per-connection limits and timers
    websocket: Arc<WebSocketConfig>,
    /// Static pages
    pages: Arc<PagesConfig>,
}

impl GatewayState {
    /// Create a new gateway state
    pub fn new(
        hub: Hub,
        gate: AuthGate,
        directory: Arc<dyn UserDirectory>,
        websocket: WebSocketConfig,
        pages: PagesConfig,
    ) -> Self {
        Self {
            hub,
            gate: Arc::new(gate),
            directory,
            websocket: Arc::new(websocket),
            pages: Arc::new(pages),
        }
    }

    pub fn hub(&self) -> &Hub {
        &self.hub
    }

    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }

    pub fn directory(&self) -> &dyn UserDirectory {
        self.directory.as_ref()
    }

    pub fn websocket(&self) -> &WebSocketConfig {
        &self.websocket
    }

    pub fn pages(&self) -> &PagesConfig {
        &self.pages
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("hub", &self.hub)
            .field("gate", &self.gate)
            .field("websocket", &self.websocket)
            .finish_non_exhaustive()
    }
}
