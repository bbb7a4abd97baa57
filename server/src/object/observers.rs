use std::collections::HashSet;

use log::warn;

use replica_shared::{ConnectionId, ConnectionView, ReplicationError, UnitError, UnitIndex};

use crate::object::ReplicatedObject;

/// Observer bookkeeping of one object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ObserverState {
    /// No rebuild has run yet, so nobody observes the object
    #[default]
    Uninitialized,
    Built(HashSet<ConnectionId>),
}

impl ObserverState {
    pub fn is_built(&self) -> bool {
        matches!(self, ObserverState::Built(_))
    }

    pub fn observers(&self) -> Option<&HashSet<ConnectionId>> {
        match self {
            ObserverState::Uninitialized => None,
            ObserverState::Built(observers) => Some(observers),
        }
    }

    pub fn contains(&self, connection: &ConnectionId) -> bool {
        self.observers()
            .map(|observers| observers.contains(connection))
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.observers()
            .map(|observers| observers.is_empty())
            .unwrap_or(true)
    }

    /// Adds one observer. Ignored before the set has been built, and for
    /// connections that already observe.
    pub fn add(&mut self, connection: ConnectionId) -> bool {
        match self {
            ObserverState::Uninitialized => {
                warn!(
                    "can't add observer {} before the observer set was built",
                    connection
                );
                false
            }
            ObserverState::Built(observers) => observers.insert(connection),
        }
    }

    pub fn remove(&mut self, connection: &ConnectionId) -> bool {
        match self {
            ObserverState::Uninitialized => false,
            ObserverState::Built(observers) => observers.remove(connection),
        }
    }

    /// Empties the set, returning who was in it
    pub fn clear(&mut self) -> Vec<ConnectionId> {
        match self {
            ObserverState::Uninitialized => Vec::new(),
            ObserverState::Built(observers) => {
                let mut removed: Vec<ConnectionId> = observers.drain().collect();
                removed.sort();
                removed
            }
        }
    }
}

/// Result of one observer rebuild
#[derive(Debug, Default)]
pub struct RebuildOutcome {
    /// Connections that just started observing, in ascending order
    pub added: Vec<ConnectionId>,
    /// Connections that stopped observing, in ascending order
    pub removed: Vec<ConnectionId>,
    /// Visibility faults raised by units along the way
    pub faults: Vec<ReplicationError>,
}

impl RebuildOutcome {
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

fn visibility_fault(
    object: &ReplicatedObject,
    unit_index: UnitIndex,
    source: UnitError,
) -> ReplicationError {
    let unit_name = object
        .unit(unit_index)
        .map(|unit| unit.name())
        .unwrap_or("unknown");
    let error = ReplicationError::VisibilityFault {
        object_id: object.id(),
        unit_index,
        unit_name,
        source,
    };
    warn!("{}", error);
    error
}

/// Recomputes who observes `object` and stores the new set.
///
/// Units with a visibility opinion each get to edit the candidate set; a
/// unit that fails is skipped and reported. Without any opinion every ready
/// connection is a candidate. The owner is always added when ready, and only
/// ready connections end up in the set.
pub fn rebuild_observers(
    object: &mut ReplicatedObject,
    connections: &dyn ConnectionView,
) -> RebuildOutcome {
    let initialize = !object.observers.is_built();
    let mut outcome = RebuildOutcome::default();

    let mut candidates: HashSet<ConnectionId> = HashSet::new();
    let mut any_opinion = false;
    let mut failures = Vec::new();

    for (index, slot) in object.slots_mut().iter_mut().enumerate() {
        match slot
            .unit_mut()
            .rebuild_observers(&mut candidates, initialize, connections)
        {
            None => {}
            Some(Ok(())) => any_opinion = true,
            Some(Err(source)) => {
                any_opinion = true;
                failures.push((index as UnitIndex, source));
            }
        }
    }
    for (index, source) in failures {
        let fault = visibility_fault(object, index, source);
        outcome.faults.push(fault);
    }

    if !any_opinion {
        candidates.extend(connections.ready_connections());
    }

    if let Some(owner) = object.owner() {
        if connections.is_ready(&owner) {
            candidates.insert(owner);
        }
    }

    candidates.retain(|connection| connections.is_ready(connection));

    let previous = match &object.observers {
        ObserverState::Uninitialized => HashSet::new(),
        ObserverState::Built(observers) => observers.clone(),
    };

    outcome.added = candidates.difference(&previous).copied().collect();
    outcome.added.sort();
    outcome.removed = previous.difference(&candidates).copied().collect();
    outcome.removed.sort();

    if let Some(host) = connections.host_connection() {
        let was_visible = previous.contains(&host);
        let visible = candidates.contains(&host);
        if initialize || was_visible != visible {
            notify_host_visibility(object, visible, &mut outcome.faults);
        }
    }

    object.observers = ObserverState::Built(candidates);
    object.rebuild_requested = false;

    outcome
}

/// Tells every unit whether the host's own connection sees the object
fn notify_host_visibility(
    object: &mut ReplicatedObject,
    visible: bool,
    faults: &mut Vec<ReplicationError>,
) {
    let mut failures = Vec::new();
    for (index, slot) in object.slots_mut().iter_mut().enumerate() {
        if let Err(source) = slot.unit_mut().on_host_visibility(visible) {
            failures.push((index as UnitIndex, source));
        }
    }
    for (index, source) in failures {
        faults.push(visibility_fault(object, index, source));
    }
}

/// Whether `connection` may observe `object`.
///
/// Every unit with an opinion must agree. A unit whose check fails counts
/// as agreeing, and its fault is returned alongside the verdict.
pub fn check_observer(
    object: &ReplicatedObject,
    connection: ConnectionId,
) -> (bool, Vec<ReplicationError>) {
    let mut faults = Vec::new();

    for (index, slot) in object.slots().iter().enumerate() {
        match slot.unit().check_observer(connection) {
            None | Some(Ok(true)) => {}
            Some(Ok(false)) => return (false, faults),
            Some(Err(source)) => {
                faults.push(visibility_fault(object, index as UnitIndex, source));
            }
        }
    }

    (true, faults)
}
