use crate::{
    bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr, serde::Serde, ConstBitLength,
};

impl Serde for bool {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bit(*self);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        reader.read_bit()
    }

    fn bit_length(&self) -> u32 {
        1
    }
}

impl ConstBitLength for bool {
    fn const_bit_length() -> u32 {
        1
    }
}

// Integers are written at their full width, two's complement for signed types.
macro_rules! impl_serde_integer {
    ($($ty:ty => $unsigned:ty),* $(,)?) => {
        $(
            impl Serde for $ty {
                fn ser(&self, writer: &mut dyn BitWrite) {
                    writer.write_bits(*self as $unsigned as u64, <$ty>::BITS as u8);
                }

                fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
                    let raw = reader.read_bits(<$ty>::BITS as u8)?;
                    Ok(raw as $unsigned as $ty)
                }

                fn bit_length(&self) -> u32 {
                    <$ty>::BITS
                }
            }

            impl ConstBitLength for $ty {
                fn const_bit_length() -> u32 {
                    <$ty>::BITS
                }
            }
        )*
    };
}

impl_serde_integer!(
    u8 => u8,
    u16 => u16,
    u32 => u32,
    u64 => u64,
    i8 => u8,
    i16 => u16,
    i32 => u32,
    i64 => u64,
);

impl Serde for f32 {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bits(self.to_bits() as u64, 32);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(f32::from_bits(reader.read_bits(32)? as u32))
    }

    fn bit_length(&self) -> u32 {
        32
    }
}

impl ConstBitLength for f32 {
    fn const_bit_length() -> u32 {
        32
    }
}

impl Serde for f64 {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bits(self.to_bits(), 64);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(f64::from_bits(reader.read_bits(64)?))
    }

    fn bit_length(&self) -> u32 {
        64
    }
}

impl ConstBitLength for f64 {
    fn const_bit_length() -> u32 {
        64
    }
}
