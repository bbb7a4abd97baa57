use std::{mem, vec::IntoIter};

use log::warn;

use replica_shared::{ConnectionId, ObjectId, ReplicationError};

/// Notifications the engine queues for the host between two reads
pub struct ReplicationEvents {
    gained: Vec<(ConnectionId, ObjectId)>,
    lost: Vec<(ConnectionId, ObjectId)>,
    errors: Vec<ReplicationError>,
    empty: bool,
}

impl Default for ReplicationEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplicationEvents {
    pub(crate) fn new() -> Self {
        Self {
            gained: Vec::new(),
            lost: Vec::new(),
            errors: Vec::new(),
            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: ReplicationEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: ReplicationEvent>(&self) -> bool {
        V::has(self)
    }

    // Crate-public

    pub(crate) fn push_gained(&mut self, connection: ConnectionId, object_id: ObjectId) {
        self.gained.push((connection, object_id));
        self.empty = false;
    }

    pub(crate) fn push_lost(&mut self, connection: ConnectionId, object_id: ObjectId) {
        self.lost.push((connection, object_id));
        self.empty = false;
    }

    pub(crate) fn push_error(&mut self, error: ReplicationError) {
        self.errors.push(error);
        self.empty = false;
    }

    pub(crate) fn take(&mut self) -> Self {
        mem::replace(self, Self::new())
    }
}

impl Drop for ReplicationEvents {
    fn drop(&mut self) {
        if !self.errors.is_empty() {
            warn!(
                "Dropped {} replication Error Event(s)! Make sure to handle these through `events.read::<ErrorEvent>()`.",
                self.errors.len()
            );
        }
    }
}

// Event Trait
pub trait ReplicationEvent {
    type Iter;

    fn iter(events: &mut ReplicationEvents) -> Self::Iter;

    fn has(events: &ReplicationEvents) -> bool;
}

// VisibilityGainedEvent
pub struct VisibilityGainedEvent;
impl ReplicationEvent for VisibilityGainedEvent {
    type Iter = IntoIter<(ConnectionId, ObjectId)>;

    fn iter(events: &mut ReplicationEvents) -> Self::Iter {
        let list = mem::take(&mut events.gained);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ReplicationEvents) -> bool {
        !events.gained.is_empty()
    }
}

// VisibilityLostEvent
pub struct VisibilityLostEvent;
impl ReplicationEvent for VisibilityLostEvent {
    type Iter = IntoIter<(ConnectionId, ObjectId)>;

    fn iter(events: &mut ReplicationEvents) -> Self::Iter {
        let list = mem::take(&mut events.lost);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ReplicationEvents) -> bool {
        !events.lost.is_empty()
    }
}

// ErrorEvent
pub struct ErrorEvent;
impl ReplicationEvent for ErrorEvent {
    type Iter = IntoIter<ReplicationError>;

    fn iter(events: &mut ReplicationEvents) -> Self::Iter {
        let list = mem::take(&mut events.errors);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ReplicationEvents) -> bool {
        !events.errors.is_empty()
    }
}
