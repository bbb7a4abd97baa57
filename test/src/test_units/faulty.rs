use std::any::Any;

use replica_shared::{BitReader, BitWrite, Serde, StateUnit, UnitError};

/// Unit whose reads & writes can be made to fail on demand
#[derive(Default)]
pub struct FaultyUnit {
    pub fail_serialize: bool,
    pub fail_deserialize: bool,
    dirty: bool,
}

impl FaultyUnit {
    pub fn failing_serialize() -> Self {
        Self {
            fail_serialize: true,
            ..Self::default()
        }
    }

    pub fn failing_deserialize() -> Self {
        Self {
            fail_deserialize: true,
            ..Self::default()
        }
    }

    pub fn touch(&mut self) {
        self.dirty = true;
    }
}

impl StateUnit for FaultyUnit {
    fn name(&self) -> &'static str {
        "FaultyUnit"
    }

    fn dirty_bits(&self) -> u64 {
        u64::from(self.dirty)
    }

    fn clear_dirty_bits(&mut self) {
        self.dirty = false;
    }

    fn serialize(&self, writer: &mut dyn BitWrite, _initial: bool) -> Result<(), UnitError> {
        if self.fail_serialize {
            return Err(UnitError::custom("refusing to serialize"));
        }
        writer.write_bit(true);
        Ok(())
    }

    fn deserialize(&mut self, reader: &mut BitReader, _initial: bool) -> Result<(), UnitError> {
        if self.fail_deserialize {
            return Err(UnitError::custom("refusing to deserialize"));
        }
        reader.read_bit()?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Writes its value twice but only reads it once, so the receiver ends up
/// short of the declared bit length
pub struct DoubleWriteUnit {
    pub value: u32,
}

impl StateUnit for DoubleWriteUnit {
    fn name(&self) -> &'static str {
        "DoubleWriteUnit"
    }

    fn dirty_bits(&self) -> u64 {
        0
    }

    fn clear_dirty_bits(&mut self) {}

    fn serialize(&self, writer: &mut dyn BitWrite, _initial: bool) -> Result<(), UnitError> {
        self.value.ser(writer);
        self.value.ser(writer);
        Ok(())
    }

    fn deserialize(&mut self, reader: &mut BitReader, _initial: bool) -> Result<(), UnitError> {
        self.value = u32::de(reader)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
