use replica_client::{ClientConfig, ClientEvents, ReplicaClient};
use replica_shared::{ConnectionId, ObjectId, StateUnit};

/// A client replica set, tagged with the connection the server knows it by
pub struct TestClient {
    pub id: ConnectionId,
    pub client: ReplicaClient,
}

impl TestClient {
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            client: ReplicaClient::new(ClientConfig::default()),
        }
    }

    /// Registers the local replica of a server object
    pub fn insert(&mut self, object_id: ObjectId, units: Vec<Box<dyn StateUnit>>) {
        self.client
            .insert_object(object_id, units)
            .expect("inserting a valid replica");
    }

    pub fn unit<T: StateUnit>(&self, object_id: &ObjectId, index: u8) -> Option<&T> {
        self.client.unit::<T>(object_id, index)
    }

    pub fn events(&mut self) -> ClientEvents {
        self.client.take_events()
    }
}
