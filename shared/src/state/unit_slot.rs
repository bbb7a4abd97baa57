use std::time::Instant;

use crate::state::StateUnit;

/// Engine-side holder of a state unit, remembering when it was last flushed
pub struct UnitSlot {
    unit: Box<dyn StateUnit>,
    last_synced: Option<Instant>,
}

impl UnitSlot {
    pub fn new(unit: Box<dyn StateUnit>) -> Self {
        Self {
            unit,
            last_synced: None,
        }
    }

    pub fn unit(&self) -> &(dyn StateUnit + 'static) {
        &*self.unit
    }

    pub fn unit_mut(&mut self) -> &mut (dyn StateUnit + 'static) {
        &mut *self.unit
    }

    pub fn last_synced(&self) -> Option<Instant> {
        self.last_synced
    }

    /// Whether the unit's sync interval has passed since its last flush. A
    /// unit that was never flushed is always due.
    pub fn interval_elapsed(&self, now: Instant) -> bool {
        match self.last_synced {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.unit.sync_interval(),
        }
    }

    /// Whether the unit has changes that may be flushed at `now`
    pub fn is_due(&self, now: Instant) -> bool {
        self.unit.dirty_bits() != 0 && self.interval_elapsed(now)
    }

    /// Clears the unit's change bits and restarts its throttle
    pub fn mark_synced(&mut self, now: Instant) {
        self.unit.clear_dirty_bits();
        self.last_synced = Some(now);
    }

    pub fn into_inner(self) -> Box<dyn StateUnit> {
        self.unit
    }
}

impl From<Box<dyn StateUnit>> for UnitSlot {
    fn from(unit: Box<dyn StateUnit>) -> Self {
        Self::new(unit)
    }
}
