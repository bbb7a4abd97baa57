use replica_serde::{BitReader, BitWrite, Serde, SerdeErr, VarIntPacker};

use crate::{
    dirty::DirtyMask,
    types::{ObjectId, Recipient},
};

const BIT_LENGTH_PACKER: VarIntPacker = VarIntPacker::new(0xFF, 0xFFFF);

/// Framing the transport sends in front of a payload.
///
/// The payload itself is only the concatenation of unit segments; the header
/// carries what the receiver needs to walk it: which units are present and
/// exactly how many bits they occupy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PayloadHeader {
    pub object_id: ObjectId,
    pub recipient: Recipient,
    /// Full state rather than changes since the last flush
    pub initial: bool,
    /// Units whose segments are present, in ascending ordinal order
    pub mask: DirtyMask,
    /// Exact number of meaningful bits in the payload, before byte padding
    pub bit_length: u32,
}

impl PayloadHeader {
    pub fn new(
        object_id: ObjectId,
        recipient: Recipient,
        initial: bool,
        mask: DirtyMask,
        bit_length: u32,
    ) -> Self {
        Self {
            object_id,
            recipient,
            initial,
            mask,
            bit_length,
        }
    }

    /// Number of bytes a payload of this header occupies on the wire
    pub fn payload_bytes(&self) -> usize {
        self.bit_length.div_ceil(8) as usize
    }
}

impl Serde for PayloadHeader {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.object_id.ser(writer);
        self.recipient.ser(writer);
        self.initial.ser(writer);
        self.mask.ser(writer);
        BIT_LENGTH_PACKER.pack(writer, u64::from(self.bit_length));
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let object_id = ObjectId::de(reader)?;
        let recipient = Recipient::de(reader)?;
        let initial = bool::de(reader)?;
        let mask = DirtyMask::de(reader)?;
        let raw_length = BIT_LENGTH_PACKER.unpack(reader)?;
        let bit_length = u32::try_from(raw_length).map_err(|_| SerdeErr::OutOfRange {
            value: i128::from(raw_length),
            min: 0,
            max: i128::from(u32::MAX),
        })?;
        Ok(Self {
            object_id,
            recipient,
            initial,
            mask,
            bit_length,
        })
    }

    fn bit_length(&self) -> u32 {
        self.object_id.bit_length()
            + self.recipient.bit_length()
            + self.initial.bit_length()
            + self.mask.bit_length()
            + BIT_LENGTH_PACKER.bit_length(u64::from(self.bit_length))
    }
}
