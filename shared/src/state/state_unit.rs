use std::{any::Any, collections::HashSet, time::Duration};

use replica_serde::{BitReader, BitWrite};

use crate::{
    error::UnitError,
    state::ConnectionView,
    types::{ConnectionId, SyncMode},
};

/// One independently replicated piece of an object's state.
///
/// The engine only ever talks to units through this trait. A unit decides for
/// itself whether it changed (`dirty_bits`), how it is encoded, and whether it
/// has an opinion on which connections may observe its object.
///
/// `deserialize` must consume exactly the bits `serialize` wrote for the same
/// `initial` flag. Payloads carry no per-unit lengths, so a unit that reads a
/// different amount shifts every unit after it.
pub trait StateUnit: Any + Send + Sync {
    /// Name used in diagnostics
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn sync_mode(&self) -> SyncMode {
        SyncMode::Observers
    }

    /// Minimum time between two flushes of this unit
    fn sync_interval(&self) -> Duration {
        Duration::ZERO
    }

    /// Unit-private change bits, zero when nothing changed since the last
    /// flush
    fn dirty_bits(&self) -> u64;

    /// Called after the unit's changes were flushed
    fn clear_dirty_bits(&mut self);

    /// Writes the full state when `initial` is set, otherwise only what
    /// changed since the last flush
    fn serialize(&self, writer: &mut dyn BitWrite, initial: bool) -> Result<(), UnitError>;

    /// Inverse of [`serialize`](Self::serialize)
    fn deserialize(&mut self, reader: &mut BitReader, initial: bool) -> Result<(), UnitError>;

    /// Adds or removes connections from the candidate observer set.
    ///
    /// Returns `None` if the unit has no opinion on visibility, which is the
    /// default. `initialize` is set on the object's first rebuild.
    fn rebuild_observers(
        &mut self,
        _observers: &mut HashSet<ConnectionId>,
        _initialize: bool,
        _connections: &dyn ConnectionView,
    ) -> Option<Result<(), UnitError>> {
        None
    }

    /// Whether `connection` may observe the object, or `None` for no opinion
    fn check_observer(&self, _connection: ConnectionId) -> Option<Result<bool, UnitError>> {
        None
    }

    /// Told whether the host's own connection currently observes the object
    fn on_host_visibility(&mut self, _visible: bool) -> Result<(), UnitError> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
