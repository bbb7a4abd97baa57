use std::collections::BTreeMap;

use log::info;

use replica_shared::{ConnectionId, ConnectionView};

/// The host's record of which connections exist and which are ready to
/// receive object state.
///
/// Owned by the host and passed into the engine on every call that needs it.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: BTreeMap<ConnectionId, bool>,
    host: Option<ConnectionId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection, not yet ready. Returns false if it was
    /// already known.
    pub fn add(&mut self, connection: ConnectionId) -> bool {
        if self.connections.contains_key(&connection) {
            return false;
        }
        info!("connection {} registered", connection);
        self.connections.insert(connection, false);
        true
    }

    /// Forgets a connection. Returns false if it was not known.
    pub fn remove(&mut self, connection: &ConnectionId) -> bool {
        if self.connections.remove(connection).is_none() {
            return false;
        }
        if self.host == Some(*connection) {
            self.host = None;
        }
        info!("connection {} removed", connection);
        true
    }

    /// Returns false if the connection is not known
    pub fn set_ready(&mut self, connection: &ConnectionId, ready: bool) -> bool {
        match self.connections.get_mut(connection) {
            Some(is_ready) => {
                *is_ready = ready;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, connection: &ConnectionId) -> bool {
        self.connections.contains_key(connection)
    }

    /// Marks `connection` as the host's own in-process connection, adding it
    /// if needed. `None` clears the designation.
    pub fn set_host_connection(&mut self, connection: Option<ConnectionId>) {
        if let Some(connection) = connection {
            self.add(connection);
        }
        self.host = connection;
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl ConnectionView for ConnectionRegistry {
    fn is_ready(&self, connection: &ConnectionId) -> bool {
        self.connections.get(connection).copied().unwrap_or(false)
    }

    fn ready_connections(&self) -> Vec<ConnectionId> {
        self.connections
            .iter()
            .filter(|(_, ready)| **ready)
            .map(|(connection, _)| *connection)
            .collect()
    }

    fn host_connection(&self) -> Option<ConnectionId> {
        self.host
    }
}
