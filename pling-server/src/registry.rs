use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;

use pling_common::ServerEvent;

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Addressable reference to one live WebSocket session: a process-unique
/// id plus the session's outbound event channel.
///
/// The id, not the channel, is the handle's identity. Two clones of the
/// same handle compare equal; handles from different connections never do,
/// even for the same user.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: u64,
    tx: mpsc::Sender<ServerEvent>,
}

impl ConnectionHandle {
    pub fn new(tx: mpsc::Sender<ServerEvent>) -> Self {
        Self {
            id: NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed),
            tx,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Queue an event for this session. Fails only if the session's
    /// outbound task has shut down (connection closed).
    pub async fn send(
        &self,
        event: ServerEvent,
    ) -> Result<(), mpsc::error::SendError<ServerEvent>> {
        self.tx.send(event).await
    }
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConnectionHandle {}

/// Identity → live connection mapping.
///
/// At most one handle per identity. Registering an identity that already
/// has a handle overwrites it (last-registration-wins); the previous
/// handle becomes unaddressable by identity but is not closed.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<String, ConnectionHandle>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, identity: impl Into<String>, handle: ConnectionHandle) {
        self.connections.insert(identity.into(), handle);
    }

    pub fn lookup(&self, identity: &str) -> Option<ConnectionHandle> {
        self.connections.get(identity).cloned()
    }

    /// Remove every entry currently mapping to exactly this handle and
    /// return the identities removed. An entry overwritten by a newer
    /// handle for the same identity is left alone, so a stale connection
    /// disconnecting cannot evict a fresh registration.
    pub fn unregister_by_handle(&mut self, handle: &ConnectionHandle) -> Vec<String> {
        let removed: Vec<String> = self
            .connections
            .iter()
            .filter(|(_, h)| *h == handle)
            .map(|(identity, _)| identity.clone())
            .collect();
        for identity in &removed {
            self.connections.remove(identity);
        }
        removed
    }

    /// Every live handle, for broadcast delivery.
    pub fn all_handles(&self) -> Vec<ConnectionHandle> {
        self.connections.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
