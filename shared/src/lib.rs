//! # Replica Shared
//! State units, dirty tracking and aggregate serialization shared between
//! replica-server & replica-client crates.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use replica_serde::{
    bit_count, BitReader, BitWrite, BitWriter, ConstBitLength, FloatPacker, RangedPacker, Serde,
    SerdeErr, VarIntPacker, Vec2Packer, Vec3Packer, VectorPacker,
};

mod dirty;
mod error;
mod serializer;
mod state;
mod types;

pub use dirty::{DirtyMask, DirtyTracker, Ordinals};
pub use error::{ErrorKind, MismatchDetail, ReplicationError, UnitError};
pub use serializer::{
    deserialize_all, serialize_all, PayloadHeader, SerializeCounts, SyncScope, UpdateMessage,
};
pub use state::{ConnectionView, StateUnit, SyncVar, UnitSlot};
pub use types::{ConnectionId, ObjectId, Recipient, SyncMode, UnitIndex, MAX_STATE_UNITS};
