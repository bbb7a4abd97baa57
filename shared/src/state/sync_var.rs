use std::ops::Deref;

use replica_serde::{BitReader, BitWrite, Serde, SerdeErr};

/// A replicated field that remembers whether it changed since the last flush
///
/// Setting a value equal to the current one does not mark the field dirty.
#[derive(Clone, Debug, PartialEq)]
pub struct SyncVar<T: Serde> {
    value: T,
    dirty: bool,
}

impl<T: Serde> SyncVar<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            dirty: false,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replaces the value, returning whether it changed
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        self.dirty = true;
        true
    }

    /// Replaces the value without marking the field dirty, used when applying
    /// remote state
    pub fn mirror(&mut self, value: T) {
        self.value = value;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear(&mut self) {
        self.dirty = false;
    }

    /// Bit `index` set if the field is dirty, for building a unit's dirty bits
    pub fn dirty_bit(&self, index: u8) -> u64 {
        if self.dirty {
            1 << index
        } else {
            0
        }
    }

    // Serialization / deserialization

    /// Writes the value unconditionally
    pub fn write(&self, writer: &mut dyn BitWrite) {
        self.value.ser(writer);
    }

    pub fn read(&mut self, reader: &mut BitReader) -> Result<(), SerdeErr> {
        self.value = T::de(reader)?;
        Ok(())
    }

    /// Writes a changed flag, followed by the value if the field is dirty
    pub fn write_delta(&self, writer: &mut dyn BitWrite) {
        writer.write_bit(self.dirty);
        if self.dirty {
            self.value.ser(writer);
        }
    }

    pub fn read_delta(&mut self, reader: &mut BitReader) -> Result<bool, SerdeErr> {
        let changed = reader.read_bit()?;
        if changed {
            self.value = T::de(reader)?;
        }
        Ok(changed)
    }

    /// Bits `write_delta` would produce right now
    pub fn delta_bit_length(&self) -> u32 {
        if self.dirty {
            1 + self.value.bit_length()
        } else {
            1
        }
    }
}

impl<T: Serde + Default> Default for SyncVar<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Serde> Deref for SyncVar<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}
