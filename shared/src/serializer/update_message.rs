use replica_serde::{BitReader, BitWrite, BitWriter, Serde};

use crate::{error::ReplicationError, serializer::PayloadHeader};

/// A header and its payload packed into one buffer: the header bits, zero
/// padding up to the next byte, then the payload bytes unchanged
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateMessage {
    pub header: PayloadHeader,
    pub payload: Vec<u8>,
}

impl UpdateMessage {
    pub fn new(header: PayloadHeader, payload: Vec<u8>) -> Self {
        Self { header, payload }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BitWriter::with_capacity(8 + self.payload.len());
        self.header.ser(&mut writer);
        while writer.bits_written() % 8 != 0 {
            writer.write_bit(false);
        }
        writer.write_bytes(&self.payload);
        writer.to_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReplicationError> {
        let mut reader = BitReader::new(bytes);
        let header = PayloadHeader::de(&mut reader)?;
        let header_bytes = reader.bit_position().div_ceil(8) as usize;
        let payload = bytes.get(header_bytes..).unwrap_or_default().to_vec();
        Ok(Self { header, payload })
    }
}
