//! Broadcast hub
//!
//! A single control loop owns the registry of live connections. Everything else
//! talks to it through a [`Hub`] handle, so registration, removal and fan-out are
//! applied strictly in submission order and never race with each other.

use crate::connection::{Connection, ConnectionId};
use chat_common::HubConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Commands processed by the hub loop
pub enum HubCommand {
    /// Add a connection; an id already present is left untouched
    Register(Connection),
    /// Remove a connection and close its queue
    Unregister(ConnectionId),
    /// Fan a payload out to every registered connection
    Broadcast(Arc<str>),
    /// Snapshot the registered ids
    Inspect(oneshot::Sender<Vec<ConnectionId>>),
    /// Close every queue, clear the registry and stop
    Shutdown(oneshot::Sender<()>),
}

impl std::fmt::Debug for HubCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Register(conn) => f.debug_tuple("Register").field(&conn.id()).finish(),
            Self::Unregister(id) => f.debug_tuple("Unregister").field(id).finish(),
            Self::Broadcast(payload) => f.debug_tuple("Broadcast").field(&payload.len()).finish(),
            Self::Inspect(_) => f.write_str("Inspect"),
            Self::Shutdown(_) => f.write_str("Shutdown"),
        }
    }
}

/// Handle to the hub loop
///
/// Cheap to clone. Submissions never fail from the caller's point of view: once
/// the loop has stopped they are dropped.
#[derive(Clone, Debug)]
pub struct Hub {
    commands: mpsc::Sender<HubCommand>,
}

impl Hub {
    /// Spawn the hub loop
    pub fn start(config: &HubConfig) -> (Self, JoinHandle<()>) {
        let (commands, receiver) = mpsc::channel(config.command_buffer.max(1));
        let registry = Registry {
            connections: HashMap::new(),
        };
        let handle = tokio::spawn(registry.run(receiver));

        tracing::info!(command_buffer = config.command_buffer, "Hub started");

        (Self { commands }, handle)
    }

    /// Register a connection
    pub async fn register(&self, connection: Connection) {
        self.submit(HubCommand::Register(connection)).await;
    }

    /// Unregister a connection
    pub async fn unregister(&self, id: ConnectionId) {
        self.submit(HubCommand::Unregister(id)).await;
    }

    /// Broadcast a payload to every registered connection
    pub async fn broadcast(&self, payload: impl Into<Arc<str>>) {
        self.submit(HubCommand::Broadcast(payload.into())).await;
    }

    /// Ids registered when the loop handles this request
    ///
    /// Empty once the loop has stopped.
    pub async fn connection_ids(&self) -> Vec<ConnectionId> {
        let (tx, rx) = oneshot::channel();
        self.submit(HubCommand::Inspect(tx)).await;
        rx.await.unwrap_or_default()
    }

    /// Number of registered connections
    pub async fn connection_count(&self) -> usize {
        self.connection_ids().await.len()
    }

    /// Close every connection and stop the loop
    ///
    /// Returns once the registry has been cleared. Calling it again is a no-op.
    pub async fn shutdown(&self) {
        let (tx, rx) = oneshot::channel();
        self.submit(HubCommand::Shutdown(tx)).await;
        let _ = rx.await;
    }

    /// Whether the loop is still accepting commands
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    async fn submit(&self, command: HubCommand) {
        if let Err(mpsc::error::SendError(command)) = self.commands.send(command).await {
            tracing::debug!(command = ?command, "Hub stopped, command dropped");
        }
    }
}

/// State owned by the hub loop
struct Registry {
    connections: HashMap<ConnectionId, Connection>,
}

impl Registry {
    async fn run(mut self, mut commands: mpsc::Receiver<HubCommand>) {
        while let Some(command) = commands.recv().await {
            match command {
                HubCommand::Register(connection) => self.register(connection),
                HubCommand::Unregister(id) => self.unregister(id),
                HubCommand::Broadcast(payload) => self.broadcast(&payload),
                HubCommand::Inspect(reply) => {
                    let _ = reply.send(self.connections.keys().copied().collect());
                }
                HubCommand::Shutdown(reply) => {
                    self.close_all();
                    let _ = reply.send(());
                    break;
                }
            }
        }

        // Either shut down or every handle is gone; queues close with the map
        self.close_all();
        tracing::info!("Hub loop ended");
    }

    fn register(&mut self, connection: Connection) {
        let id = connection.id();
        if self.connections.contains_key(&id) {
            tracing::debug!(connection_id = %id, "Connection already registered");
            return;
        }

        tracing::debug!(
            connection_id = %id,
            user_id = %connection.identity().user_id,
            "Connection registered"
        );
        self.connections.insert(id, connection);
    }

    fn unregister(&mut self, id: ConnectionId) {
        if let Some(connection) = self.connections.remove(&id) {
            connection.mark_dead();
            tracing::debug!(connection_id = %id, "Connection unregistered");
        }
    }

    fn broadcast(&mut self, payload: &Arc<str>) {
        let mut evicted = Vec::new();

        for (id, connection) in &self.connections {
            match connection.try_deliver(payload) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(connection_id = %id, "Outbound queue full, evicting connection");
                    evicted.push(*id);
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(connection_id = %id, "Outbound queue closed, evicting connection");
                    evicted.push(*id);
                }
            }
        }

        for id in evicted {
            self.unregister(id);
        }

        tracing::trace!(recipients = self.connections.len(), "Broadcast delivered");
    }

    fn close_all(&mut self) {
        for (_, connection) in self.connections.drain() {
            connection.mark_dead();
        }
    }
}
