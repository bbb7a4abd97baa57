use crate::{bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr};

/// Quantizes floats in `[min, max]` onto `bits` bits.
///
/// Values outside the range are clamped. Precision is
/// `(max - min) / (2^bits - 1)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloatPacker {
    min: f32,
    max: f32,
    bits: u8,
    max_quantized: u64,
    multiplier: f64,
}

impl FloatPacker {
    /// Symmetric packer over `[-max, max]`
    ///
    /// # Panics
    ///
    /// Panics if `max` is not positive or `bits` is not in `1..=32`.
    pub fn new(max: f32, bits: u8) -> Self {
        Self::ranged(-max, max, bits)
    }

    /// # Panics
    ///
    /// Panics if `max <= min` or `bits` is not in `1..=32`.
    pub fn ranged(min: f32, max: f32, bits: u8) -> Self {
        if bits == 0 || bits > 32 {
            panic!("FloatPacker bit count must be in 1..=32, got {}", bits);
        }
        if !(max > min) {
            panic!("FloatPacker range [{}, {}] is empty", min, max);
        }
        let max_quantized = (1u64 << bits) - 1;
        Self {
            min,
            max,
            bits,
            max_quantized,
            multiplier: max_quantized as f64 / (max as f64 - min as f64),
        }
    }

    pub fn bit_length(&self) -> u32 {
        self.bits as u32
    }

    /// Largest error introduced by quantization
    pub fn precision(&self) -> f32 {
        (1.0 / self.multiplier) as f32
    }

    pub fn pack(&self, writer: &mut dyn BitWrite, value: f32) {
        // NaN quantizes to the bottom of the range
        let clamped = if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        };
        let scaled = ((clamped as f64 - self.min as f64) * self.multiplier).round() as u64;
        writer.write_bits(scaled.min(self.max_quantized), self.bits);
    }

    pub fn unpack(&self, reader: &mut BitReader) -> Result<f32, SerdeErr> {
        let scaled = reader.read_bits(self.bits)?;
        Ok((scaled as f64 / self.multiplier + self.min as f64) as f32)
    }
}

/// Packs an `N` axis vector with one independently configured
/// [`FloatPacker`] per axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VectorPacker<const N: usize> {
    axes: [FloatPacker; N],
}

pub type Vec2Packer = VectorPacker<2>;
pub type Vec3Packer = VectorPacker<3>;

impl<const N: usize> VectorPacker<N> {
    /// Symmetric bounds per axis, see [`FloatPacker::new`]
    pub fn new(max: [f32; N], bits: [u8; N]) -> Self {
        Self {
            axes: std::array::from_fn(|axis| FloatPacker::new(max[axis], bits[axis])),
        }
    }

    pub fn from_axes(axes: [FloatPacker; N]) -> Self {
        Self { axes }
    }

    pub fn axes(&self) -> &[FloatPacker; N] {
        &self.axes
    }

    pub fn bit_length(&self) -> u32 {
        self.axes.iter().map(FloatPacker::bit_length).sum()
    }

    pub fn pack(&self, writer: &mut dyn BitWrite, value: &[f32; N]) {
        for (packer, component) in self.axes.iter().zip(value.iter()) {
            packer.pack(writer, *component);
        }
    }

    pub fn unpack(&self, reader: &mut BitReader) -> Result<[f32; N], SerdeErr> {
        let mut output = [0.0; N];
        for (packer, component) in self.axes.iter().zip(output.iter_mut()) {
            *component = packer.unpack(reader)?;
        }
        Ok(output)
    }
}
