use crate::{
    bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr, impls::string::LENGTH_PACKER,
    serde::Serde,
};

impl<T: Serde> Serde for Vec<T> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        LENGTH_PACKER.pack(writer, self.len() as u64);
        for item in self {
            item.ser(writer);
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let length = LENGTH_PACKER.unpack(reader)? as usize;
        // every element costs at least one bit, which bounds the allocation
        let mut output = Vec::with_capacity(length.min(reader.bits_remaining() as usize));
        for _ in 0..length {
            output.push(T::de(reader)?);
        }
        Ok(output)
    }

    fn bit_length(&self) -> u32 {
        LENGTH_PACKER.bit_length(self.len() as u64)
            + self.iter().map(Serde::bit_length).sum::<u32>()
    }
}
