//! A single chat connection
//!
//! The registry side of a connection: who is connected and the sending end of
//! their outbound queue. The receiving end travels with the pump as a [`Mailbox`].

use chat_core::Snowflake;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

/// Unique identifier of a live connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh random id
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who is on the other end of a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Snowflake,
    pub display_name: String,
}

impl Identity {
    pub fn new(user_id: Snowflake, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
        }
    }
}

/// A registered connection
///
/// Owned by the hub registry. It holds the only sender of the outbound queue, so
/// dropping it closes the queue and lets the writer send its close frame.
pub struct Connection {
    id: ConnectionId,
    identity: Arc<Identity>,
    sender: mpsc::Sender<Arc<str>>,
    alive: Arc<AtomicBool>,
}

/// The pump's end of a connection
pub struct Mailbox {
    id: ConnectionId,
    identity: Arc<Identity>,
    receiver: mpsc::Receiver<Arc<str>>,
    alive: Arc<AtomicBool>,
}

impl Connection {
    /// Create a connection with an outbound queue of `capacity` payloads
    pub fn open(identity: Identity, capacity: usize) -> (Self, Mailbox) {
        Self::open_with_id(ConnectionId::new(), identity, capacity)
    }

    pub(crate) fn open_with_id(
        id: ConnectionId,
        identity: Identity,
        capacity: usize,
    ) -> (Self, Mailbox) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let identity = Arc::new(identity);
        let alive = Arc::new(AtomicBool::new(true));

        let connection = Self {
            id,
            identity: Arc::clone(&identity),
            sender,
            alive: Arc::clone(&alive),
        };
        let mailbox = Mailbox {
            id,
            identity,
            receiver,
            alive,
        };

        (connection, mailbox)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Queue a payload without waiting
    pub(crate) fn try_deliver(&self, payload: &Arc<str>) -> Result<(), TrySendError<Arc<str>>> {
        self.sender.try_send(Arc::clone(payload))
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("user_id", &self.identity.user_id)
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl Mailbox {
    pub(crate) fn into_parts(self) -> (ConnectionHandle, mpsc::Receiver<Arc<str>>) {
        let handle = ConnectionHandle {
            id: self.id,
            identity: self.identity,
            alive: self.alive,
        };
        (handle, self.receiver)
    }
}

impl fmt::Debug for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailbox")
            .field("id", &self.id)
            .field("queued", &self.receiver.len())
            .finish()
    }
}

/// Identity and liveness of a connection once its queue has been handed to the writer
#[derive(Debug, Clone)]
pub(crate) struct ConnectionHandle {
    pub(crate) id: ConnectionId,
    pub(crate) identity: Arc<Identity>,
    alive: Arc<AtomicBool>,
}

impl ConnectionHandle {
    pub(crate) fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}
