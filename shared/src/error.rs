use thiserror::Error;

use replica_serde::SerdeErr;

use crate::types::{ConnectionId, ObjectId, UnitIndex, MAX_STATE_UNITS};

/// Failure raised by a state unit's own code
#[derive(Debug, Error)]
pub enum UnitError {
    /// The unit's data could not be packed or unpacked
    #[error(transparent)]
    Serde(#[from] SerdeErr),

    /// Any other failure reported by the unit
    #[error("{0}")]
    Custom(String),
}

impl UnitError {
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}

/// Discriminant of [`ReplicationError`], for diagnostics
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    SerializationFault,
    DeserializationFault,
    DeserializationMismatch,
    VisibilityFault,
    OwnershipConflict,
    UnknownObject,
    MalformedHeader,
}

/// Structural check that failed while reading a payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MismatchDetail {
    /// The units together did not consume exactly the declared payload
    #[error("state units consumed {consumed_bits} bits of a {expected_bits} bit payload")]
    Length { expected_bits: u32, consumed_bits: u32 },

    /// The header declares more bits than the payload holds
    #[error("header declares {declared_bits} bits but the payload only holds {available_bits}")]
    Truncated { declared_bits: u32, available_bits: u32 },

    /// The payload names a unit the receiving object does not have
    #[error("payload references state unit {unit_index} but the object only has {unit_count}")]
    UnknownUnit { unit_index: UnitIndex, unit_count: usize },

    /// An observers payload carried data of an owner-only unit
    #[error("observers payload contains owner-only state unit {unit_index}")]
    OwnerUnitInObserversPayload { unit_index: UnitIndex },
}

/// Errors produced by the replication engine
///
/// Each call site decides between propagating and isolating: write-path
/// faults propagate, visibility faults are isolated per unit, and read-path
/// failures abandon only the payload they occurred in.
#[derive(Debug, Error)]
pub enum ReplicationError {
    /// Object has more state units than the dirty mask can address
    #[error("Object {object_id} has {unit_count} state units, at most {max} are supported", max = MAX_STATE_UNITS)]
    Configuration {
        object_id: ObjectId,
        unit_count: usize,
    },

    /// A state unit failed while writing its data
    #[error("State unit {unit_index} ({unit_name}) of object {object_id} failed to serialize: {source}")]
    SerializationFault {
        object_id: ObjectId,
        unit_index: UnitIndex,
        unit_name: &'static str,
        source: UnitError,
    },

    /// A state unit failed while reading its data
    #[error("State unit {unit_index} ({unit_name}) of object {object_id} failed to deserialize: {source}")]
    DeserializationFault {
        object_id: ObjectId,
        unit_index: UnitIndex,
        unit_name: &'static str,
        source: UnitError,
    },

    /// No unit failed, but the payload's bit accounting does not close
    #[error("Deserialization mismatch on object {object_id}: {detail}")]
    DeserializationMismatch {
        object_id: ObjectId,
        detail: MismatchDetail,
    },

    /// A state unit's visibility predicate failed
    #[error("Visibility check of state unit {unit_index} ({unit_name}) on object {object_id} failed: {source}")]
    VisibilityFault {
        object_id: ObjectId,
        unit_index: UnitIndex,
        unit_name: &'static str,
        source: UnitError,
    },

    /// Object already has an owning connection
    #[error("Object {object_id} is already owned by connection {existing}, refusing to assign connection {requested}")]
    OwnershipConflict {
        object_id: ObjectId,
        existing: ConnectionId,
        requested: ConnectionId,
    },

    /// Payload or request addressed an object that is not registered
    #[error("Object {object_id} does not exist")]
    UnknownObject { object_id: ObjectId },

    /// The transport-owned header in front of a payload could not be read
    #[error("Malformed payload header: {0}")]
    MalformedHeader(#[from] SerdeErr),
}

impl ReplicationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReplicationError::Configuration { .. } => ErrorKind::Configuration,
            ReplicationError::SerializationFault { .. } => ErrorKind::SerializationFault,
            ReplicationError::DeserializationFault { .. } => ErrorKind::DeserializationFault,
            ReplicationError::DeserializationMismatch { .. } => {
                ErrorKind::DeserializationMismatch
            }
            ReplicationError::VisibilityFault { .. } => ErrorKind::VisibilityFault,
            ReplicationError::OwnershipConflict { .. } => ErrorKind::OwnershipConflict,
            ReplicationError::UnknownObject { .. } => ErrorKind::UnknownObject,
            ReplicationError::MalformedHeader(_) => ErrorKind::MalformedHeader,
        }
    }

    /// Object the error concerns, if it could be determined
    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            ReplicationError::Configuration { object_id, .. }
            | ReplicationError::SerializationFault { object_id, .. }
            | ReplicationError::DeserializationFault { object_id, .. }
            | ReplicationError::DeserializationMismatch { object_id, .. }
            | ReplicationError::VisibilityFault { object_id, .. }
            | ReplicationError::OwnershipConflict { object_id, .. }
            | ReplicationError::UnknownObject { object_id } => Some(*object_id),
            ReplicationError::MalformedHeader(_) => None,
        }
    }

    /// Ordinal of the state unit at fault, if a single unit is to blame
    pub fn unit_index(&self) -> Option<UnitIndex> {
        match self {
            ReplicationError::SerializationFault { unit_index, .. }
            | ReplicationError::DeserializationFault { unit_index, .. }
            | ReplicationError::VisibilityFault { unit_index, .. } => Some(*unit_index),
            ReplicationError::DeserializationMismatch { detail, .. } => match detail {
                MismatchDetail::UnknownUnit { unit_index, .. }
                | MismatchDetail::OwnerUnitInObserversPayload { unit_index } => Some(*unit_index),
                MismatchDetail::Length { .. } | MismatchDetail::Truncated { .. } => None,
            },
            _ => None,
        }
    }
}
