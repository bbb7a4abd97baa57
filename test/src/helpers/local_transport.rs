use replica_server::transport::PayloadSender;
use replica_shared::{ConnectionId, ObjectId, PayloadHeader, UpdateMessage};

/// One payload as handed to the transport
#[derive(Clone, Debug)]
pub struct SentPayload {
    pub recipients: Vec<ConnectionId>,
    pub header: PayloadHeader,
    pub payload: Vec<u8>,
}

impl SentPayload {
    /// The payload as it would travel on the wire
    pub fn to_message_bytes(&self) -> Vec<u8> {
        UpdateMessage::new(self.header.clone(), self.payload.clone()).to_bytes()
    }
}

/// In-memory transport that queues everything it is asked to send
#[derive(Debug, Default)]
pub struct LocalTransport {
    sent: Vec<SentPayload>,
    removals: Vec<(ConnectionId, ObjectId)>,
}

impl LocalTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> &[SentPayload] {
        &self.sent
    }

    pub fn removals(&self) -> &[(ConnectionId, ObjectId)] {
        &self.removals
    }

    pub fn is_empty(&self) -> bool {
        self.sent.is_empty() && self.removals.is_empty()
    }

    /// Payloads addressed to `connection`
    pub fn sent_to(&self, connection: ConnectionId) -> Vec<&SentPayload> {
        self.sent
            .iter()
            .filter(|sent| sent.recipients.contains(&connection))
            .collect()
    }

    pub fn take_sent(&mut self) -> Vec<SentPayload> {
        std::mem::take(&mut self.sent)
    }

    pub fn take_removals(&mut self) -> Vec<(ConnectionId, ObjectId)> {
        std::mem::take(&mut self.removals)
    }

    pub fn clear(&mut self) {
        self.sent.clear();
        self.removals.clear();
    }
}

impl PayloadSender for LocalTransport {
    fn send(&mut self, recipients: &[ConnectionId], header: &PayloadHeader, payload: &[u8]) {
        self.sent.push(SentPayload {
            recipients: recipients.to_vec(),
            header: header.clone(),
            payload: payload.to_vec(),
        });
    }

    fn send_removal(&mut self, recipient: ConnectionId, object_id: ObjectId) {
        self.removals.push((recipient, object_id));
    }
}
