/// Anything bits can be written into.
///
/// Bits are packed LSB-first within each byte, and multi-bit values are
/// written least significant bit first.
pub trait BitWrite {
    fn write_bit(&mut self, bit: bool);

    /// Number of bits written so far
    fn bit_position(&self) -> u32;

    /// Writes the lowest `bits` bits of `value`
    fn write_bits(&mut self, value: u64, bits: u8) {
        for index in 0..bits {
            self.write_bit((value >> index) & 1 != 0);
        }
    }

    fn write_byte(&mut self, byte: u8) {
        self.write_bits(byte as u64, 8);
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.write_byte(*byte);
        }
    }
}

/// A growable bit buffer.
///
/// Unlike a datagram-sized buffer this never overflows: it grows to fit
/// whatever the state units write, and the last byte is zero-padded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitWriter {
    buffer: Vec<u8>,
    bits_written: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(bytes),
            bits_written: 0,
        }
    }

    pub fn bits_written(&self) -> u32 {
        self.bits_written
    }

    /// Number of bytes the written bits occupy, counting the padded last byte
    pub fn bytes_written(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits_written == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn to_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Resets the writer so its allocation can be reused
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.bits_written = 0;
    }

    /// Returns the bit at `index`, or `None` if it has not been written yet
    pub fn bit_at(&self, index: u32) -> Option<bool> {
        if index >= self.bits_written {
            return None;
        }
        let byte = self.buffer[(index / 8) as usize];
        Some(byte & (1 << (index % 8)) != 0)
    }

    /// Appends the bits `start..end` of `source` onto this writer.
    ///
    /// The range is clamped to what `source` has actually written.
    pub fn copy_bits_from(&mut self, source: &BitWriter, start: u32, end: u32) {
        let end = end.min(source.bits_written);
        let mut index = start;

        // whole bytes when both sides are aligned
        if index % 8 == 0 && self.bits_written % 8 == 0 {
            let whole_bytes = ((end - index.min(end)) / 8) as usize;
            let first = (index / 8) as usize;
            self.buffer
                .extend_from_slice(&source.buffer[first..first + whole_bytes]);
            self.bits_written += (whole_bytes as u32) * 8;
            index += (whole_bytes as u32) * 8;
        }

        while index < end {
            if let Some(bit) = source.bit_at(index) {
                self.write_bit(bit);
            }
            index += 1;
        }
    }
}

impl BitWrite for BitWriter {
    fn write_bit(&mut self, bit: bool) {
        let offset = self.bits_written % 8;
        if offset == 0 {
            self.buffer.push(0);
        }
        if bit {
            if let Some(last) = self.buffer.last_mut() {
                *last |= 1 << offset;
            }
        }
        self.bits_written += 1;
    }

    fn bit_position(&self) -> u32 {
        self.bits_written
    }
}
