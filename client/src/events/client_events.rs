use std::{mem, vec::IntoIter};

use log::warn;

use replica_shared::{ObjectId, Recipient, ReplicationError, StateUnit};

pub struct ClientEvents {
    updates: Vec<(ObjectId, Recipient, bool)>,
    removals: Vec<(ObjectId, Vec<Box<dyn StateUnit>>)>,
    errors: Vec<ReplicationError>,
    empty: bool,
}

impl Default for ClientEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientEvents {
    pub(crate) fn new() -> Self {
        Self {
            updates: Vec::new(),
            removals: Vec::new(),
            errors: Vec::new(),
            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: ClientEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: ClientEvent>(&self) -> bool {
        V::has(self)
    }

    // Crate-public

    pub(crate) fn push_update(&mut self, object_id: ObjectId, recipient: Recipient, initial: bool) {
        self.updates.push((object_id, recipient, initial));
        self.empty = false;
    }

    pub(crate) fn push_removal(&mut self, object_id: ObjectId, units: Vec<Box<dyn StateUnit>>) {
        self.removals.push((object_id, units));
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

impl Drop for ClientEvents {
    fn drop(&mut self) {
        if !self.errors.is_empty() {
            warn!(
                "Dropped {} Client Error Event(s)! Make sure to handle these through `events.read::<ErrorEvent>()`.",
                self.errors.len()
            );
        }
    }
}

// Event Trait
pub trait ClientEvent {
    type Iter;

    fn iter(events: &mut ClientEvents) -> Self::Iter;

    fn has(events: &ClientEvents) -> bool;
}

// UpdatedEvent
/// A payload was applied: object, payload class and whether it was a full sync
pub struct UpdatedEvent;
impl ClientEvent for UpdatedEvent {
    type Iter = IntoIter<(ObjectId, Recipient, bool)>;

    fn iter(events: &mut ClientEvents) -> Self::Iter {
        let list = mem::take(&mut events.updates);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ClientEvents) -> bool {
        !events.updates.is_empty()
    }
}

// RemovedEvent
/// The server stopped sending an object; its units are handed back
pub struct RemovedEvent;
impl ClientEvent for RemovedEvent {
    type Iter = IntoIter<(ObjectId, Vec<Box<dyn StateUnit>>)>;

    fn iter(events: &mut ClientEvents) -> Self::Iter {
        let list = mem::take(&mut events.removals);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ClientEvents) -> bool {
        !events.removals.is_empty()
    }
}

// ErrorEvent
pub struct ErrorEvent;
impl ClientEvent for ErrorEvent {
    type Iter = IntoIter<ReplicationError>;

    fn iter(events: &mut ClientEvents) -> Self::Iter {
        let list = mem::take(&mut events.errors);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ClientEvents) -> bool {
        !events.errors.is_empty()
    }
}
