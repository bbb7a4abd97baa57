use std::{collections::BTreeMap, time::Instant};

use log::{debug, info, warn};

use replica_shared::{
    serialize_all, BitWriter, ConnectionId, ConnectionView, ObjectId, PayloadHeader, Recipient,
    ReplicationError, SerializeCounts, StateUnit, SyncScope, UnitIndex, UnitSlot,
    MAX_STATE_UNITS,
};

use crate::{
    events::ReplicationEvents,
    object::{check_observer, rebuild_observers, ReplicatedObject},
    server::ServerConfig,
    transport::PayloadSender,
};

/// Authoritative side of the replication engine.
///
/// Driven by the host once per tick through [`update`](Self::update): every
/// object gets its observer set refreshed when due, then its dirty units
/// flushed into an owner payload and an observers payload.
pub struct ReplicationServer {
    config: ServerConfig,
    objects: BTreeMap<ObjectId, ReplicatedObject>,
    next_object_id: u32,
    events: ReplicationEvents,
}

impl ReplicationServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            objects: BTreeMap::new(),
            next_object_id: 0,
            events: ReplicationEvents::new(),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Hands over every event queued since the last call
    pub fn take_events(&mut self) -> ReplicationEvents {
        self.events.take()
    }

    // Objects

    /// Registers a new object. Its observers are built on the next update.
    pub fn spawn_object(
        &mut self,
        units: Vec<Box<dyn StateUnit>>,
        owner: Option<ConnectionId>,
    ) -> Result<ObjectId, ReplicationError> {
        let object_id = ObjectId::new(self.next_object_id);
        if units.len() > MAX_STATE_UNITS {
            return Err(ReplicationError::Configuration {
                object_id,
                unit_count: units.len(),
            });
        }
        self.next_object_id += 1;

        info!(
            "spawned object {} with {} state units",
            object_id,
            units.len()
        );
        self.objects
            .insert(object_id, ReplicatedObject::new(object_id, units, owner));
        Ok(object_id)
    }

    /// Removes an object, telling every observer it is gone, and gives its
    /// units back
    pub fn despawn_object(
        &mut self,
        object_id: &ObjectId,
        transport: &mut dyn PayloadSender,
    ) -> Result<Vec<Box<dyn StateUnit>>, ReplicationError> {
        let mut object = self
            .objects
            .remove(object_id)
            .ok_or(ReplicationError::UnknownObject {
                object_id: *object_id,
            })?;

        for connection in object.observers.clear() {
            transport.send_removal(connection, *object_id);
            self.events.push_lost(connection, *object_id);
        }

        info!("despawned object {}", object_id);
        Ok(object.into_units())
    }

    pub fn has_object(&self, object_id: &ObjectId) -> bool {
        self.objects.contains_key(object_id)
    }

    pub fn object(&self, object_id: &ObjectId) -> Option<&ReplicatedObject> {
        self.objects.get(object_id)
    }

    pub fn object_mut(&mut self, object_id: &ObjectId) -> Option<&mut ReplicatedObject> {
        self.objects.get_mut(object_id)
    }

    pub fn objects(&self) -> impl Iterator<Item = &ReplicatedObject> {
        self.objects.values()
    }

    /// The unit at `index` of an object, if it is a `T`
    pub fn unit<T: StateUnit>(&self, object_id: &ObjectId, index: UnitIndex) -> Option<&T> {
        self.objects.get(object_id)?.unit_as::<T>(index)
    }

    pub fn unit_mut<T: StateUnit>(
        &mut self,
        object_id: &ObjectId,
        index: UnitIndex,
    ) -> Option<&mut T> {
        self.objects.get_mut(object_id)?.unit_as_mut::<T>(index)
    }

    fn object_or_err(
        &mut self,
        object_id: &ObjectId,
    ) -> Result<&mut ReplicatedObject, ReplicationError> {
        self.objects
            .get_mut(object_id)
            .ok_or(ReplicationError::UnknownObject {
                object_id: *object_id,
            })
    }

    // Ownership

    /// Assigns the owning connection. Fails with
    /// [`ReplicationError::OwnershipConflict`] if another connection already
    /// owns the object, which then keeps its original owner.
    pub fn set_owner(
        &mut self,
        object_id: &ObjectId,
        connection: ConnectionId,
    ) -> Result<(), ReplicationError> {
        let object = self.object_or_err(object_id)?;
        object.set_owner(connection)?;
        object.request_rebuild();
        Ok(())
    }

    pub fn remove_owner(
        &mut self,
        object_id: &ObjectId,
    ) -> Result<Option<ConnectionId>, ReplicationError> {
        let object = self.object_or_err(object_id)?;
        let previous = object.remove_owner();
        object.request_rebuild();
        Ok(previous)
    }

    // Observers

    pub fn request_rebuild(&mut self, object_id: &ObjectId) -> Result<(), ReplicationError> {
        self.object_or_err(object_id)?.request_rebuild();
        Ok(())
    }

    pub fn request_rebuild_all(&mut self) {
        for object in self.objects.values_mut() {
            object.request_rebuild();
        }
    }

    /// Makes `connection` observe an object right away, sending it a full
    /// sync. Returns false if nothing changed.
    pub fn add_observer(
        &mut self,
        connections: &dyn ConnectionView,
        object_id: &ObjectId,
        connection: ConnectionId,
        transport: &mut dyn PayloadSender,
    ) -> Result<bool, ReplicationError> {
        let object = self
            .objects
            .get_mut(object_id)
            .ok_or(ReplicationError::UnknownObject {
                object_id: *object_id,
            })?;
        if !connections.is_ready(&connection) {
            warn!(
                "not adding connection {} as observer of object {}, it is not ready",
                connection, object_id
            );
            return Ok(false);
        }
        if !object.observers.add(connection) {
            return Ok(false);
        }
        send_full_sync(object, &[connection], transport)?;
        self.events.push_gained(connection, *object_id);
        Ok(true)
    }

    /// Stops `connection` from observing an object, sending it a removal
    pub fn remove_observer(
        &mut self,
        object_id: &ObjectId,
        connection: &ConnectionId,
        transport: &mut dyn PayloadSender,
    ) -> Result<bool, ReplicationError> {
        let object = self
            .objects
            .get_mut(object_id)
            .ok_or(ReplicationError::UnknownObject {
                object_id: *object_id,
            })?;
        if !object.observers.remove(connection) {
            return Ok(false);
        }
        transport.send_removal(*connection, *object_id);
        self.events.push_lost(*connection, *object_id);
        Ok(true)
    }

    pub fn clear_observers(
        &mut self,
        object_id: &ObjectId,
        transport: &mut dyn PayloadSender,
    ) -> Result<(), ReplicationError> {
        let object = self
            .objects
            .get_mut(object_id)
            .ok_or(ReplicationError::UnknownObject {
                object_id: *object_id,
            })?;
        for connection in object.observers.clear() {
            transport.send_removal(connection, *object_id);
            self.events.push_lost(connection, *object_id);
        }
        Ok(())
    }

    // Connections

    /// Lets a connection that just became ready observe every object whose
    /// units accept it, without rebuilding anything. Objects the connection
    /// owns always accept it. Returns how many objects it was admitted to.
    pub fn connection_ready(
        &mut self,
        connections: &dyn ConnectionView,
        connection: ConnectionId,
        transport: &mut dyn PayloadSender,
    ) -> Result<usize, ReplicationError> {
        if !connections.is_ready(&connection) {
            warn!(
                "connection {} reported ready but the registry disagrees",
                connection
            );
            return Ok(0);
        }

        let mut admitted = 0;
        for object in self.objects.values_mut() {
            if !object.observers.is_built() || object.is_observer(&connection) {
                continue;
            }

            let (visible, faults) = check_observer(object, connection);
            for fault in faults {
                self.events.push_error(fault);
            }
            if !visible && object.owner() != Some(connection) {
                continue;
            }

            object.observers.add(connection);
            send_full_sync(object, &[connection], transport)?;
            self.events.push_gained(connection, object.id());
            admitted += 1;
        }

        debug!("connection {} admitted to {} objects", connection, admitted);
        Ok(admitted)
    }

    /// Forgets a connection everywhere: it stops observing every object and
    /// loses ownership of the ones it owned
    pub fn connection_removed(&mut self, connection: &ConnectionId) {
        for object in self.objects.values_mut() {
            if object.observers.remove(connection) {
                self.events.push_lost(*connection, object.id());
            }
            if object.owner() == Some(*connection) {
                object.remove_owner();
            }
        }
        info!("connection {} removed from replication", connection);
    }

    // Tick

    /// Runs one tick over every object.
    ///
    /// Visibility faults are reported through events and never stop the
    /// tick. A unit failing to serialize, or an object with too many units,
    /// aborts the tick with that error.
    pub fn update(
        &mut self,
        connections: &dyn ConnectionView,
        transport: &mut dyn PayloadSender,
        now: Instant,
    ) -> Result<(), ReplicationError> {
        for object in self.objects.values_mut() {
            let mut fresh = Vec::new();

            if needs_rebuild(object, &self.config, now) {
                let outcome = rebuild_observers(object, connections);
                object.last_rebuild = Some(now);

                for fault in outcome.faults {
                    self.events.push_error(fault);
                }
                for connection in &outcome.removed {
                    transport.send_removal(*connection, object.id());
                    self.events.push_lost(*connection, object.id());
                }
                send_full_sync(object, &outcome.added, transport)?;
                for connection in &outcome.added {
                    self.events.push_gained(*connection, object.id());
                }
                fresh = outcome.added;
            }

            flush_object(object, connections, &self.config, &fresh, transport, now)?;
        }

        Ok(())
    }
}

fn needs_rebuild(object: &ReplicatedObject, config: &ServerConfig, now: Instant) -> bool {
    if !object.observers.is_built() || object.rebuild_requested {
        return true;
    }
    match (config.observer_rebuild_interval, object.last_rebuild) {
        (Some(interval), Some(last)) => now.saturating_duration_since(last) >= interval,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

fn send_payload(
    transport: &mut dyn PayloadSender,
    recipients: &[ConnectionId],
    object_id: ObjectId,
    recipient: Recipient,
    initial: bool,
    counts: &SerializeCounts,
    writer: &BitWriter,
) {
    if recipients.is_empty() || counts.written(recipient) == 0 {
        return;
    }
    let header = PayloadHeader::new(
        object_id,
        recipient,
        initial,
        counts.mask(recipient),
        writer.bits_written(),
    );
    transport.send(recipients, &header, writer.as_bytes());
}

/// Sends the object's full state to `recipients`: the owner payload if the
/// owner is among them, the observers payload to everyone else
fn send_full_sync(
    object: &ReplicatedObject,
    recipients: &[ConnectionId],
    transport: &mut dyn PayloadSender,
) -> Result<(), ReplicationError> {
    if recipients.is_empty() {
        return Ok(());
    }

    let mut owner_writer = BitWriter::new();
    let mut observers_writer = BitWriter::new();
    let counts = serialize_all(
        object.id(),
        object.slots().iter().map(UnitSlot::unit),
        SyncScope::Initial,
        &mut owner_writer,
        &mut observers_writer,
    )?;

    let owner = object.owner().filter(|owner| recipients.contains(owner));
    if let Some(owner) = owner {
        send_payload(
            transport,
            &[owner],
            object.id(),
            Recipient::Owner,
            true,
            &counts,
            &owner_writer,
        );
    }

    let others: Vec<ConnectionId> = recipients
        .iter()
        .copied()
        .filter(|connection| Some(*connection) != owner)
        .collect();
    send_payload(
        transport,
        &others,
        object.id(),
        Recipient::Observers,
        true,
        &counts,
        &observers_writer,
    );

    Ok(())
}

/// Flushes the object's dirty units to its observers, and the owner payload
/// to a ready owner whether or not it observes. Connections in `fresh` just
/// got a full sync and are skipped.
fn flush_object(
    object: &mut ReplicatedObject,
    connections: &dyn ConnectionView,
    config: &ServerConfig,
    fresh: &[ConnectionId],
    transport: &mut dyn PayloadSender,
    now: Instant,
) -> Result<(), ReplicationError> {
    let mask = object.take_dirty_mask(now);
    if mask.is_clear() {
        return Ok(());
    }

    let owner = object
        .owner()
        .filter(|owner| connections.is_ready(owner) && !fresh.contains(owner));

    if object.observers.is_empty() && owner.is_none() {
        if config.clear_dirty_without_observers {
            object.mark_synced(mask, now);
        }
        return Ok(());
    }

    let mut owner_writer = BitWriter::new();
    let mut observers_writer = BitWriter::new();
    let counts = serialize_all(
        object.id(),
        object.slots().iter().map(UnitSlot::unit),
        SyncScope::Delta(mask),
        &mut owner_writer,
        &mut observers_writer,
    )?;

    if let Some(owner) = owner {
        send_payload(
            transport,
            &[owner],
            object.id(),
            Recipient::Owner,
            false,
            &counts,
            &owner_writer,
        );
    }

    let mut recipients: Vec<ConnectionId> = object
        .observers()
        .map(|observers| {
            observers
                .iter()
                .copied()
                .filter(|connection| {
                    Some(*connection) != object.owner() && !fresh.contains(connection)
                })
                .collect()
        })
        .unwrap_or_default();
    recipients.sort();
    send_payload(
        transport,
        &recipients,
        object.id(),
        Recipient::Observers,
        false,
        &counts,
        &observers_writer,
    );

    debug!(
        "object {} flushed {} units to owner and {} units to {} observers",
        object.id(),
        counts.owner_written,
        counts.observers_written,
        recipients.len()
    );

    object.mark_synced(counts.owner_mask, now);
    Ok(())
}
