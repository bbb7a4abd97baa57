use crate::{bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr};

/// Number of bits needed to represent `max_value`
pub const fn bit_count(max_value: u64) -> u8 {
    (64 - max_value.leading_zeros()) as u8
}

const fn bit_mask(bits: u8) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1 << bits) - 1
    }
}

/// Packs unsigned integers into one of three widths.
///
/// Small values cost a `0` tag bit plus the small width, medium values a
/// `1,0` tag plus the medium width, and anything larger a `1,1` tag plus the
/// large width. The widths are the bit counts of the values given to the
/// constructor, so `VarIntPacker::new(4, 64)` writes `0..=7` in 4 bits and
/// `8..=127` in 9 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VarIntPacker {
    small_bits: u8,
    medium_bits: u8,
    large_bits: u8,
    small_max: u64,
    medium_max: u64,
    large_max: u64,
}

impl VarIntPacker {
    /// Packer with a 64-bit large tier, so every `u64` is encodable
    ///
    /// # Panics
    ///
    /// Panics if `small_value` is zero or `medium_value` does not need more
    /// bits than `small_value`.
    pub const fn new(small_value: u64, medium_value: u64) -> Self {
        Self::from_bit_counts(bit_count(small_value), bit_count(medium_value), 64)
    }

    /// Packer with an explicit large tier; values above it are rejected by
    /// [`try_pack`](Self::try_pack)
    ///
    /// # Panics
    ///
    /// Panics if the three widths are not strictly increasing.
    pub const fn with_large(small_value: u64, medium_value: u64, large_value: u64) -> Self {
        Self::from_bit_counts(
            bit_count(small_value),
            bit_count(medium_value),
            bit_count(large_value),
        )
    }

    /// # Panics
    ///
    /// Panics if the widths are not strictly increasing, start at zero or
    /// exceed 64 bits.
    pub const fn from_bit_counts(small_bits: u8, medium_bits: u8, large_bits: u8) -> Self {
        if small_bits == 0 {
            panic!("can't create a VarIntPacker with a 0 bit small tier");
        }
        if small_bits >= medium_bits || medium_bits >= large_bits {
            panic!("VarIntPacker tiers must be strictly increasing in width");
        }
        if large_bits > 64 {
            panic!("can't create a VarIntPacker with more than 64 bits");
        }
        Self {
            small_bits,
            medium_bits,
            large_bits,
            small_max: bit_mask(small_bits),
            medium_max: bit_mask(medium_bits),
            large_max: bit_mask(large_bits),
        }
    }

    pub fn small_bits(&self) -> u8 {
        self.small_bits
    }

    pub fn medium_bits(&self) -> u8 {
        self.medium_bits
    }

    pub fn large_bits(&self) -> u8 {
        self.large_bits
    }

    /// Largest value this packer can encode without truncation
    pub fn max_value(&self) -> u64 {
        self.large_max
    }

    /// Writes `value`, truncating it to the large width if it does not fit
    pub fn pack(&self, writer: &mut dyn BitWrite, value: u64) {
        if value <= self.small_max {
            writer.write_bit(false);
            writer.write_bits(value, self.small_bits);
        } else if value <= self.medium_max {
            writer.write_bits(0b01, 2);
            writer.write_bits(value, self.medium_bits);
        } else {
            writer.write_bits(0b11, 2);
            writer.write_bits(value & self.large_max, self.large_bits);
        }
    }

    /// Writes `value`, or fails without writing anything if it does not fit
    pub fn try_pack(&self, writer: &mut dyn BitWrite, value: u64) -> Result<(), SerdeErr> {
        if value > self.large_max {
            return Err(SerdeErr::OutOfRange {
                value: value as i128,
                min: 0,
                max: self.large_max as i128,
            });
        }
        self.pack(writer, value);
        Ok(())
    }

    pub fn unpack(&self, reader: &mut BitReader) -> Result<u64, SerdeErr> {
        if !reader.read_bit()? {
            return reader.read_bits(self.small_bits);
        }
        if !reader.read_bit()? {
            return reader.read_bits(self.medium_bits);
        }
        reader.read_bits(self.large_bits)
    }

    /// Number of bits `pack` writes for `value`
    pub fn bit_length(&self, value: u64) -> u32 {
        if value <= self.small_max {
            1 + self.small_bits as u32
        } else if value <= self.medium_max {
            2 + self.medium_bits as u32
        } else {
            2 + self.large_bits as u32
        }
    }
}
