use std::collections::BTreeMap;

use log::{info, warn};

use replica_shared::{
    deserialize_all, ConnectionId, ObjectId, PayloadHeader, ReplicationError, StateUnit,
    UnitIndex, UpdateMessage, MAX_STATE_UNITS,
};

use crate::{client::ClientConfig, events::ClientEvents};

/// Local replicas of server objects, updated from incoming payloads.
///
/// Every payload is applied on its own: a payload that fails leaves its
/// object partially updated at worst and never touches any other object.
pub struct ReplicaClient {
    config: ClientConfig,
    objects: BTreeMap<ObjectId, Vec<Box<dyn StateUnit>>>,
    events: ClientEvents,
}

impl ReplicaClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            objects: BTreeMap::new(),
            events: ClientEvents::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Hands over every event queued since the last call
    pub fn take_events(&mut self) -> ClientEvents {
        self.events.take()
    }

    // Objects

    /// Registers the local replica of a server object. The units must be in
    /// the same order as on the server. Returns the replica it replaced.
    pub fn insert_object(
        &mut self,
        object_id: ObjectId,
        units: Vec<Box<dyn StateUnit>>,
    ) -> Result<Option<Vec<Box<dyn StateUnit>>>, ReplicationError> {
        if units.len() > MAX_STATE_UNITS {
            return Err(ReplicationError::Configuration {
                object_id,
                unit_count: units.len(),
            });
        }
        Ok(self.objects.insert(object_id, units))
    }

    pub fn remove_object(&mut self, object_id: &ObjectId) -> Option<Vec<Box<dyn StateUnit>>> {
        self.objects.remove(object_id)
    }

    pub fn has_object(&self, object_id: &ObjectId) -> bool {
        self.objects.contains_key(object_id)
    }

    pub fn object_ids(&self) -> impl Iterator<Item = &ObjectId> {
        self.objects.keys()
    }

    pub fn object(&self, object_id: &ObjectId) -> Option<&[Box<dyn StateUnit>]> {
        self.objects.get(object_id).map(Vec::as_slice)
    }

    /// The unit at `index` of an object, if it is a `T`
    pub fn unit<T: StateUnit>(&self, object_id: &ObjectId, index: UnitIndex) -> Option<&T> {
        self.objects
            .get(object_id)?
            .get(usize::from(index))?
            .as_any()
            .downcast_ref::<T>()
    }

    pub fn unit_mut<T: StateUnit>(
        &mut self,
        object_id: &ObjectId,
        index: UnitIndex,
    ) -> Option<&mut T> {
        self.objects
            .get_mut(object_id)?
            .get_mut(usize::from(index))?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    // Incoming

    /// Applies one payload from `sender` to the object named in `header`.
    /// Returns the number of units that were updated.
    pub fn receive(
        &mut self,
        sender: ConnectionId,
        header: &PayloadHeader,
        payload: &[u8],
    ) -> Result<usize, ReplicationError> {
        let result = match self.objects.get_mut(&header.object_id) {
            Some(units) => deserialize_all(
                header.object_id,
                units.iter_mut().map(|unit| &mut **unit),
                header,
                payload,
            ),
            None => Err(ReplicationError::UnknownObject {
                object_id: header.object_id,
            }),
        };

        match result {
            Ok(applied) => {
                self.events
                    .push_update(header.object_id, header.recipient, header.initial);
                Ok(applied)
            }
            Err(error) => {
                if self.config.log_payload_errors {
                    warn!("dropping payload from connection {}: {}", sender, error);
                }
                Err(error)
            }
        }
    }

    /// Decodes a packed [`UpdateMessage`] and applies it
    pub fn receive_message(
        &mut self,
        sender: ConnectionId,
        bytes: &[u8],
    ) -> Result<usize, ReplicationError> {
        let message = match UpdateMessage::from_bytes(bytes) {
            Ok(message) => message,
            Err(error) => {
                if self.config.log_payload_errors {
                    warn!("dropping message from connection {}: {}", sender, error);
                }
                return Err(error);
            }
        };
        self.receive(sender, &message.header, &message.payload)
    }

    /// Applies a batch of packed messages independently. Failures are queued
    /// as error events; returns how many messages were applied.
    pub fn receive_all<'m, I>(&mut self, sender: ConnectionId, messages: I) -> usize
    where
        I: IntoIterator<Item = &'m [u8]>,
    {
        let mut applied = 0;
        for bytes in messages {
            match self.receive_message(sender, bytes) {
                Ok(_) => applied += 1,
                Err(error) => self.events.push_error(error),
            }
        }
        applied
    }

    /// The server stopped sending `object_id` to this client. The replica is
    /// dropped and its units handed back through a removal event.
    pub fn receive_removal(&mut self, object_id: &ObjectId) -> bool {
        match self.objects.remove(object_id) {
            Some(units) => {
                info!("object {} removed by server", object_id);
                self.events.push_removal(*object_id, units);
                true
            }
            None => {
                warn!("removal of unknown object {}", object_id);
                false
            }
        }
    }
}
