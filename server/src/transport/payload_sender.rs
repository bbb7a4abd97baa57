use replica_shared::{ConnectionId, ObjectId, PayloadHeader};

/// Outbound side of the host's transport.
///
/// Sends are fire-and-forget: the engine never waits on delivery, and
/// reliability or ordering are the transport's concern.
pub trait PayloadSender {
    /// Sends one payload to every connection in `recipients`. Never called
    /// with an empty payload or an empty recipient list.
    fn send(&mut self, recipients: &[ConnectionId], header: &PayloadHeader, payload: &[u8]);

    /// Tells `recipient` it no longer observes `object_id`
    fn send_removal(&mut self, recipient: ConnectionId, object_id: ObjectId);
}
