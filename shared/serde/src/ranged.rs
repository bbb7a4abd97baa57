use crate::{bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr, var_int::bit_count};

/// Packs integers from a statically known range `[min, max]`.
///
/// Values are written as their offset from `min` in exactly
/// `bit_count(max - min)` bits, with no tag bits, so `[-1, 1]` costs 2 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangedPacker {
    min: i64,
    max: i64,
    bits: u8,
}

impl RangedPacker {
    /// # Panics
    ///
    /// Panics if `max` is not greater than `min`.
    pub const fn new(min: i64, max: i64) -> Self {
        if max <= min {
            panic!("RangedPacker requires max to be greater than min");
        }
        let range = (max as i128 - min as i128) as u64;
        Self {
            min,
            max,
            bits: bit_count(range),
        }
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    /// Number of bits every value costs
    pub fn bit_length(&self) -> u32 {
        self.bits as u32
    }

    fn out_of_range(&self, value: i128) -> SerdeErr {
        SerdeErr::OutOfRange {
            value,
            min: self.min as i128,
            max: self.max as i128,
        }
    }

    fn write_offset(&self, writer: &mut dyn BitWrite, value: i64) {
        let offset = (value as i128 - self.min as i128) as u64;
        writer.write_bits(offset, self.bits);
    }

    /// Writes `value`, clamping it into the range first
    pub fn pack(&self, writer: &mut dyn BitWrite, value: i64) {
        self.write_offset(writer, value.clamp(self.min, self.max));
    }

    /// Writes `value`, or fails without writing anything if it is out of range
    pub fn try_pack(&self, writer: &mut dyn BitWrite, value: i64) -> Result<(), SerdeErr> {
        if value < self.min || value > self.max {
            return Err(self.out_of_range(value as i128));
        }
        self.write_offset(writer, value);
        Ok(())
    }

    /// Reads a value back; offsets that land past `max` mean the stream is
    /// not what this packer wrote
    pub fn unpack(&self, reader: &mut BitReader) -> Result<i64, SerdeErr> {
        let offset = reader.read_bits(self.bits)?;
        let value = self.min as i128 + offset as i128;
        if value > self.max as i128 {
            return Err(self.out_of_range(value));
        }
        Ok(value as i64)
    }
}
