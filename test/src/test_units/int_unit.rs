use std::{any::Any, time::Duration};

use replica_shared::{BitReader, BitWrite, StateUnit, SyncMode, SyncVar, UnitError};

/// A single replicated `i32`, written in full on initial syncs and as a
/// changed flag plus value on deltas
pub struct IntUnit {
    value: SyncVar<i32>,
    mode: SyncMode,
    interval: Duration,
}

impl IntUnit {
    pub fn new(value: i32) -> Self {
        Self {
            value: SyncVar::new(value),
            mode: SyncMode::Observers,
            interval: Duration::ZERO,
        }
    }

    pub fn owner_only(value: i32) -> Self {
        Self {
            mode: SyncMode::Owner,
            ..Self::new(value)
        }
    }

    pub fn with_interval(value: i32, interval: Duration) -> Self {
        Self {
            interval,
            ..Self::new(value)
        }
    }

    pub fn boxed(value: i32) -> Box<dyn StateUnit> {
        Box::new(Self::new(value))
    }

    pub fn get(&self) -> i32 {
        *self.value
    }

    pub fn set(&mut self, value: i32) {
        self.value.set(value);
    }
}

impl StateUnit for IntUnit {
    fn name(&self) -> &'static str {
        "IntUnit"
    }

    fn sync_mode(&self) -> SyncMode {
        self.mode
    }

    fn sync_interval(&self) -> Duration {
        self.interval
    }

    fn dirty_bits(&self) -> u64 {
        self.value.dirty_bit(0)
    }

    fn clear_dirty_bits(&mut self) {
        self.value.clear();
    }

    fn serialize(&self, writer: &mut dyn BitWrite, initial: bool) -> Result<(), UnitError> {
        if initial {
            self.value.write(writer);
        } else {
            self.value.write_delta(writer);
        }
        Ok(())
    }

    fn deserialize(&mut self, reader: &mut BitReader, initial: bool) -> Result<(), UnitError> {
        if initial {
            self.value.read(reader)?;
        } else {
            self.value.read_delta(reader)?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
