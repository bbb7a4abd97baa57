use crate::error::SerdeErr;

/// Cursor over a bit-packed buffer produced by a [`BitWriter`](crate::BitWriter).
///
/// The reader knows how many bits are meaningful; reading past that point
/// fails without moving the cursor.
#[derive(Clone, Debug)]
pub struct BitReader<'b> {
    buffer: &'b [u8],
    bit_length: u32,
    position: u32,
}

impl<'b> BitReader<'b> {
    /// Reader over every bit of `buffer`, padding included
    pub fn new(buffer: &'b [u8]) -> Self {
        let bit_length = (buffer.len() as u64 * 8).min(u32::MAX as u64) as u32;
        Self {
            buffer,
            bit_length,
            position: 0,
        }
    }

    /// Reader that stops after `bit_length` bits. A length larger than the
    /// buffer is clamped to the buffer.
    pub fn with_bit_length(buffer: &'b [u8], bit_length: u32) -> Self {
        let mut reader = Self::new(buffer);
        reader.bit_length = reader.bit_length.min(bit_length);
        reader
    }

    pub fn bit_position(&self) -> u32 {
        self.position
    }

    pub fn bit_length(&self) -> u32 {
        self.bit_length
    }

    pub fn bits_remaining(&self) -> u32 {
        self.bit_length - self.position
    }

    pub fn is_finished(&self) -> bool {
        self.position == self.bit_length
    }

    fn ensure(&self, requested: u32) -> Result<(), SerdeErr> {
        let remaining = self.bits_remaining();
        if requested > remaining {
            return Err(SerdeErr::EndOfStream {
                requested,
                remaining,
            });
        }
        Ok(())
    }

    fn take_bit(&mut self) -> bool {
        let byte = self.buffer[(self.position / 8) as usize];
        let bit = byte & (1 << (self.position % 8)) != 0;
        self.position += 1;
        bit
    }

    pub fn read_bit(&mut self) -> Result<bool, SerdeErr> {
        self.ensure(1)?;
        Ok(self.take_bit())
    }

    /// Reads `bits` bits (at most 64) written LSB-first
    pub fn read_bits(&mut self, bits: u8) -> Result<u64, SerdeErr> {
        debug_assert!(bits <= 64, "can't read more than 64 bits into a u64");
        self.ensure(bits as u32)?;

        let mut output: u64 = 0;
        for index in 0..bits {
            if self.take_bit() {
                output |= 1 << index;
            }
        }
        Ok(output)
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        Ok(self.read_bits(8)? as u8)
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, SerdeErr> {
        let remaining = self.bits_remaining();
        match count.checked_mul(8).map(u32::try_from) {
            Some(Ok(requested)) => self.ensure(requested)?,
            _ => {
                return Err(SerdeErr::EndOfStream {
                    requested: u32::MAX,
                    remaining,
                })
            }
        }

        let mut output = Vec::with_capacity(count);
        for _ in 0..count {
            output.push(self.read_bits(8)? as u8);
        }
        Ok(output)
    }
}
