use std::{collections::HashSet, time::Instant};

use replica_shared::{
    ConnectionId, DirtyMask, DirtyTracker, ObjectId, ReplicationError, StateUnit, UnitIndex,
    UnitSlot,
};

use crate::object::ObserverState;

/// A networked object: an ordered list of state units plus the bookkeeping
/// the engine keeps for it between ticks
pub struct ReplicatedObject {
    id: ObjectId,
    slots: Vec<UnitSlot>,
    owner: Option<ConnectionId>,
    pub(crate) observers: ObserverState,
    tracker: DirtyTracker,
    pub(crate) rebuild_requested: bool,
    pub(crate) last_rebuild: Option<Instant>,
}

impl ReplicatedObject {
    pub(crate) fn new(
        id: ObjectId,
        units: Vec<Box<dyn StateUnit>>,
        owner: Option<ConnectionId>,
    ) -> Self {
        Self {
            id,
            slots: units.into_iter().map(UnitSlot::new).collect(),
            owner,
            observers: ObserverState::Uninitialized,
            tracker: DirtyTracker::new(),
            rebuild_requested: false,
            last_rebuild: None,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn unit_count(&self) -> usize {
        self.slots.len()
    }

    pub fn unit(&self, index: UnitIndex) -> Option<&dyn StateUnit> {
        let slot = self.slots.get(usize::from(index))?;
        Some(slot.unit())
    }

    pub fn unit_mut(&mut self, index: UnitIndex) -> Option<&mut dyn StateUnit> {
        let slot = self.slots.get_mut(usize::from(index))?;
        Some(slot.unit_mut())
    }

    /// The unit at `index`, if it is a `T`
    pub fn unit_as<T: StateUnit>(&self, index: UnitIndex) -> Option<&T> {
        self.unit(index)?.as_any().downcast_ref::<T>()
    }

    pub fn unit_as_mut<T: StateUnit>(&mut self, index: UnitIndex) -> Option<&mut T> {
        self.unit_mut(index)?.as_any_mut().downcast_mut::<T>()
    }

    pub(crate) fn slots(&self) -> &[UnitSlot] {
        &self.slots
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [UnitSlot] {
        &mut self.slots
    }

    pub(crate) fn into_units(self) -> Vec<Box<dyn StateUnit>> {
        self.slots.into_iter().map(UnitSlot::into_inner).collect()
    }

    // Ownership

    pub fn owner(&self) -> Option<ConnectionId> {
        self.owner
    }

    /// Assigns the owning connection. Reassigning the current owner is a
    /// no-op; any other connection is refused while an owner is set.
    pub fn set_owner(&mut self, connection: ConnectionId) -> Result<(), ReplicationError> {
        match self.owner {
            Some(existing) if existing != connection => Err(ReplicationError::OwnershipConflict {
                object_id: self.id,
                existing,
                requested: connection,
            }),
            _ => {
                self.owner = Some(connection);
                Ok(())
            }
        }
    }

    pub fn remove_owner(&mut self) -> Option<ConnectionId> {
        self.owner.take()
    }

    // Observers

    pub fn observer_state(&self) -> &ObserverState {
        &self.observers
    }

    /// Current observers, or `None` before the first rebuild
    pub fn observers(&self) -> Option<&HashSet<ConnectionId>> {
        self.observers.observers()
    }

    pub fn is_observer(&self, connection: &ConnectionId) -> bool {
        self.observers.contains(connection)
    }

    /// Asks for the observer set to be rebuilt on the next update
    pub fn request_rebuild(&mut self) {
        self.rebuild_requested = true;
    }

    // Dirty tracking

    /// Forces the unit at `index` into the next flush its sync interval
    /// allows, regardless of what it reports itself
    pub fn mark_dirty(&mut self, index: UnitIndex) {
        self.tracker.mark_dirty(index);
    }

    pub fn is_any_dirty(&self) -> bool {
        self.tracker.is_any_dirty()
    }

    /// Gathers every unit due for a flush at `now` and hands back the mask.
    /// Marks on units still inside their sync interval are kept for a later
    /// tick.
    pub(crate) fn take_dirty_mask(&mut self, now: Instant) -> DirtyMask {
        self.tracker.take_due(&self.slots, now)
    }

    /// Clears the units in `mask` and restarts their sync intervals
    pub(crate) fn mark_synced(&mut self, mask: DirtyMask, now: Instant) {
        for index in mask.ordinals() {
            if let Some(slot) = self.slots.get_mut(usize::from(index)) {
                slot.mark_synced(now);
            }
        }
    }
}
