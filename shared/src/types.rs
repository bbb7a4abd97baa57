use std::fmt;

use replica_serde::{BitReader, BitWrite, Serde, SerdeErr, VarIntPacker};

/// Position of a state unit inside its object. Doubles as the unit's bit in
/// the dirty mask and its ordinal on the wire.
pub type UnitIndex = u8;

/// Width of the dirty mask, and so the most state units an object may hold
pub const MAX_STATE_UNITS: usize = 64;

const ID_PACKER: VarIntPacker = VarIntPacker::new(0xFF, 0xFFFF);

/// Identity of a replicated object, unique for the object's lifetime
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serde for ObjectId {
    fn ser(&self, writer: &mut dyn BitWrite) {
        ID_PACKER.pack(writer, u64::from(self.0));
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let value = ID_PACKER.unpack(reader)?;
        let id = u32::try_from(value).map_err(|_| SerdeErr::OutOfRange {
            value: i128::from(value),
            min: 0,
            max: i128::from(u32::MAX),
        })?;
        Ok(Self(id))
    }

    fn bit_length(&self) -> u32 {
        ID_PACKER.bit_length(u64::from(self.0))
    }
}

/// Identity of a connection as handed out by the host's transport
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u32);

impl ConnectionId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which payload a state unit's data goes into
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SyncMode {
    /// Sent to every observer, owner included
    #[default]
    Observers,
    /// Sent only to the owning connection
    Owner,
}

/// Class of connection a payload is built for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Recipient {
    Owner,
    Observers,
}

impl Recipient {
    /// Whether a unit with `mode` belongs in a payload for this recipient
    pub fn includes(self, mode: SyncMode) -> bool {
        match self {
            Recipient::Owner => true,
            Recipient::Observers => mode == SyncMode::Observers,
        }
    }
}

impl Serde for Recipient {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bit(*self == Recipient::Owner);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        if reader.read_bit()? {
            Ok(Recipient::Owner)
        } else {
            Ok(Recipient::Observers)
        }
    }

    fn bit_length(&self) -> u32 {
        1
    }
}
