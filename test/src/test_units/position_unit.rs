use std::any::Any;

use replica_shared::{
    BitReader, BitWrite, RangedPacker, StateUnit, UnitError, Vec3Packer,
};

const HEADING: RangedPacker = RangedPacker::new(-1, 1);

/// A quantized position plus a -1/0/1 heading
pub struct PositionUnit {
    pub position: [f32; 3],
    pub heading: i64,
    packer: Vec3Packer,
    dirty: bool,
}

impl PositionUnit {
    pub fn new(position: [f32; 3], heading: i64) -> Self {
        Self {
            position,
            heading,
            packer: Vec3Packer::new([100.0, 100.0, 100.0], [16, 16, 16]),
            dirty: false,
        }
    }

    pub fn move_to(&mut self, position: [f32; 3], heading: i64) {
        self.position = position;
        self.heading = heading;
        self.dirty = true;
    }

    /// Largest quantization error on any axis
    pub fn precision(&self) -> f32 {
        self.packer
            .axes()
            .iter()
            .map(|axis| axis.precision())
            .fold(0.0, f32::max)
    }

    /// Bits every serialization of this unit costs
    pub fn bit_length(&self) -> u32 {
        self.packer.bit_length() + HEADING.bit_length()
    }
}

impl StateUnit for PositionUnit {
    fn name(&self) -> &'static str {
        "PositionUnit"
    }

    fn dirty_bits(&self) -> u64 {
        u64::from(self.dirty)
    }

    fn clear_dirty_bits(&mut self) {
        self.dirty = false;
    }

    fn serialize(&self, writer: &mut dyn BitWrite, _initial: bool) -> Result<(), UnitError> {
        self.packer.pack(writer, &self.position);
        HEADING.try_pack(writer, self.heading)?;
        Ok(())
    }

    fn deserialize(&mut self, reader: &mut BitReader, _initial: bool) -> Result<(), UnitError> {
        self.position = self.packer.unpack(reader)?;
        self.heading = HEADING.unpack(reader)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
