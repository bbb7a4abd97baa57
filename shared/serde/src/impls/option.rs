use crate::{bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr, serde::Serde};

impl<T: Serde> Serde for Option<T> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        match self {
            Some(value) => {
                writer.write_bit(true);
                value.ser(writer);
            }
            None => writer.write_bit(false),
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        if reader.read_bit()? {
            Ok(Some(T::de(reader)?))
        } else {
            Ok(None)
        }
    }

    fn bit_length(&self) -> u32 {
        match self {
            Some(value) => 1 + value.bit_length(),
            None => 1,
        }
    }
}
