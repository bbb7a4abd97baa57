use crate::{
    bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr, serde::Serde,
    var_int::VarIntPacker,
};

// Lengths up to 255 cost 9 bits, up to 65535 cost 18.
pub(crate) const LENGTH_PACKER: VarIntPacker = VarIntPacker::new(255, 65_535);

impl Serde for String {
    fn ser(&self, writer: &mut dyn BitWrite) {
        LENGTH_PACKER.pack(writer, self.len() as u64);
        writer.write_bytes(self.as_bytes());
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let length = LENGTH_PACKER.unpack(reader)?;
        let remaining = reader.bits_remaining();
        if length > u64::from(remaining / 8) {
            return Err(SerdeErr::EndOfStream {
                requested: u32::try_from(length.saturating_mul(8)).unwrap_or(u32::MAX),
                remaining,
            });
        }
        let bytes = reader.read_bytes(length as usize)?;
        String::from_utf8(bytes).map_err(|_| SerdeErr::InvalidUtf8)
    }

    fn bit_length(&self) -> u32 {
        LENGTH_PACKER.bit_length(self.len() as u64) + (self.len() as u32) * 8
    }
}
