use crate::{bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr};

/// A type that can be written to and read from a bit stream.
///
/// `de` must consume exactly the bits `ser` produced for the same value;
/// the aggregate serializer relies on that to find where the next state
/// unit's data begins.
pub trait Serde: Sized + Clone + PartialEq {
    /// Writes the value into the bit stream
    fn ser(&self, writer: &mut dyn BitWrite);

    /// Reads a value back out of the bit stream
    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr>;

    /// Number of bits `ser` will write for this value
    fn bit_length(&self) -> u32;
}

/// Types whose encoded size does not depend on their value
pub trait ConstBitLength {
    fn const_bit_length() -> u32;
}
