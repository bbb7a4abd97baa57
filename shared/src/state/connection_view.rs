use crate::types::ConnectionId;

/// Read-only view of the host's connections, handed to state units while
/// they vote on visibility
pub trait ConnectionView {
    /// Whether `connection` is known and ready to receive object state
    fn is_ready(&self, connection: &ConnectionId) -> bool;

    /// Every ready connection, in ascending id order
    fn ready_connections(&self) -> Vec<ConnectionId>;

    /// The in-process connection of a host that is also a client, if any
    fn host_connection(&self) -> Option<ConnectionId>;
}
