use std::fmt;

use replica_serde::{BitReader, BitWrite, Serde, SerdeErr, VarIntPacker};

use crate::types::{UnitIndex, MAX_STATE_UNITS};

// Most objects only have a handful of units, so most masks fit the small tier
const MASK_PACKER: VarIntPacker = VarIntPacker::new(0xFF, 0xFFFF);

/// One bit per state unit, bit `i` standing for the unit at ordinal `i`
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DirtyMask(u64);

impl DirtyMask {
    pub const EMPTY: DirtyMask = DirtyMask(0);

    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Mask with the lowest `unit_count` bits set
    pub fn full(unit_count: usize) -> Self {
        if unit_count >= MAX_STATE_UNITS {
            Self(u64::MAX)
        } else {
            Self((1 << unit_count) - 1)
        }
    }

    pub fn bits(&self) -> u64 {
        self.0
    }

    /// Sets the bit of `index`; indices past the mask width are ignored
    pub fn set_bit(&mut self, index: UnitIndex) {
        if usize::from(index) < MAX_STATE_UNITS {
            self.0 |= 1 << index;
        }
    }

    pub fn is_set(&self, index: UnitIndex) -> bool {
        usize::from(index) < MAX_STATE_UNITS && self.0 & (1 << index) != 0
    }

    pub fn is_clear(&self) -> bool {
        self.0 == 0
    }

    pub fn or(&self, other: DirtyMask) -> DirtyMask {
        DirtyMask(self.0 | other.0)
    }

    pub fn and(&self, other: DirtyMask) -> DirtyMask {
        DirtyMask(self.0 & other.0)
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Number of set bits
    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Highest set ordinal, if any
    pub fn highest(&self) -> Option<UnitIndex> {
        if self.0 == 0 {
            None
        } else {
            Some((63 - self.0.leading_zeros()) as UnitIndex)
        }
    }

    /// Set ordinals in ascending order
    pub fn ordinals(&self) -> Ordinals {
        Ordinals { remaining: self.0 }
    }
}

impl fmt::Debug for DirtyMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DirtyMask({:#b})", self.0)
    }
}

impl Serde for DirtyMask {
    fn ser(&self, writer: &mut dyn BitWrite) {
        MASK_PACKER.pack(writer, self.0);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self(MASK_PACKER.unpack(reader)?))
    }

    fn bit_length(&self) -> u32 {
        MASK_PACKER.bit_length(self.0)
    }
}

/// Iterator over the set ordinals of a [`DirtyMask`]
pub struct Ordinals {
    remaining: u64,
}

impl Iterator for Ordinals {
    type Item = UnitIndex;

    fn next(&mut self) -> Option<UnitIndex> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.remaining.trailing_zeros() as UnitIndex;
        self.remaining &= self.remaining - 1;
        Some(index)
    }
}
