use std::time::Instant;

use log::warn;

use crate::{
    dirty::DirtyMask,
    state::UnitSlot,
    types::{UnitIndex, MAX_STATE_UNITS},
};

/// Aggregates which of an object's state units have changes to flush.
///
/// Whether a unit changed is the unit's own business; the tracker only
/// collects the answers into one mask per object.
#[derive(Debug, Default)]
pub struct DirtyTracker {
    mask: DirtyMask,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_dirty(&mut self, index: UnitIndex) {
        if usize::from(index) >= MAX_STATE_UNITS {
            warn!(
                "ignoring dirty mark for state unit {}, masks only hold {} units",
                index, MAX_STATE_UNITS
            );
            return;
        }
        self.mask.set_bit(index);
    }

    pub fn is_any_dirty(&self) -> bool {
        !self.mask.is_clear()
    }

    /// Current mask without clearing it
    pub fn peek(&self) -> DirtyMask {
        self.mask
    }

    /// Returns the mask and resets it to empty
    pub fn snapshot_and_clear(&mut self) -> DirtyMask {
        std::mem::take(&mut self.mask)
    }

    /// Marks every unit that reports changes and whose sync interval has
    /// elapsed at `now`. Throttled units stay dirty on their own side, so
    /// they are picked up again by a later collect.
    pub fn collect(&mut self, slots: &[UnitSlot], now: Instant) {
        for (index, slot) in slots.iter().enumerate().take(MAX_STATE_UNITS) {
            if slot.is_due(now) {
                self.mask.set_bit(index as UnitIndex);
            }
        }
    }

    /// Collects at `now`, then hands back every marked unit whose sync
    /// interval has elapsed. Explicit marks on throttled units stay in the
    /// tracker until their interval is up; marks past the last slot are
    /// dropped.
    pub fn take_due(&mut self, slots: &[UnitSlot], now: Instant) -> DirtyMask {
        self.collect(slots, now);

        let mut due = DirtyMask::EMPTY;
        for index in self.snapshot_and_clear().ordinals() {
            match slots.get(usize::from(index)) {
                Some(slot) if slot.interval_elapsed(now) => due.set_bit(index),
                Some(_) => self.mask.set_bit(index),
                None => {}
            }
        }
        due
    }
}
