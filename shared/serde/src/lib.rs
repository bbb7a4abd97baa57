//! # Replica Serde
//! Bit-level codec used to pack replicated state: a growable bit writer, a
//! bounded bit reader, and packers for variable-width integers, ranged
//! integers and quantized vectors.

#![deny(unstable_features, unused_import_braces)]

mod bit_reader;
mod bit_writer;
mod error;
mod float;
mod impls;
mod ranged;
mod serde;
mod var_int;

pub use bit_reader::BitReader;
pub use bit_writer::{BitWrite, BitWriter};
pub use error::SerdeErr;
pub use float::{FloatPacker, Vec2Packer, Vec3Packer, VectorPacker};
pub use ranged::RangedPacker;
pub use serde::{ConstBitLength, Serde};
pub use var_int::{bit_count, VarIntPacker};
