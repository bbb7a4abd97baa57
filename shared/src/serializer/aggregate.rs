use log::trace;

use replica_serde::{BitReader, BitWriter};

use crate::{
    dirty::DirtyMask,
    error::{MismatchDetail, ReplicationError},
    serializer::PayloadHeader,
    state::StateUnit,
    types::{ObjectId, Recipient, SyncMode, UnitIndex, MAX_STATE_UNITS},
};

/// Which units a serialize pass covers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncScope {
    /// Every unit, full state
    Initial,
    /// Only the units in the mask, changes since their last flush
    Delta(DirtyMask),
}

impl SyncScope {
    pub fn is_initial(&self) -> bool {
        matches!(self, SyncScope::Initial)
    }

    pub fn includes(&self, index: UnitIndex) -> bool {
        match self {
            SyncScope::Initial => true,
            SyncScope::Delta(mask) => mask.is_set(index),
        }
    }
}

/// What a serialize pass wrote, per recipient class
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SerializeCounts {
    pub owner_written: usize,
    pub observers_written: usize,
    pub owner_mask: DirtyMask,
    pub observers_mask: DirtyMask,
}

impl SerializeCounts {
    pub fn is_empty(&self) -> bool {
        self.owner_written == 0 && self.observers_written == 0
    }

    pub fn written(&self, recipient: Recipient) -> usize {
        match recipient {
            Recipient::Owner => self.owner_written,
            Recipient::Observers => self.observers_written,
        }
    }

    pub fn mask(&self, recipient: Recipient) -> DirtyMask {
        match recipient {
            Recipient::Owner => self.owner_mask,
            Recipient::Observers => self.observers_mask,
        }
    }
}

fn check_unit_count(object_id: ObjectId, unit_count: usize) -> Result<(), ReplicationError> {
    if unit_count > MAX_STATE_UNITS {
        return Err(ReplicationError::Configuration {
            object_id,
            unit_count,
        });
    }
    Ok(())
}

/// Serializes an object's units into the owner and observers payloads in one
/// pass.
///
/// Every unit in `scope` is written once, into `owner_writer`. Units synced to
/// observers then have the bits they just produced copied onto
/// `observers_writer`, so both payloads stay a plain concatenation of unit
/// segments in ordinal order.
///
/// Fails with [`ReplicationError::Configuration`] before writing anything if
/// there are more units than a mask can address. A unit failing to serialize
/// aborts the pass with [`ReplicationError::SerializationFault`]; the writers
/// then hold a partial payload that must not be sent.
pub fn serialize_all<'u, I>(
    object_id: ObjectId,
    units: I,
    scope: SyncScope,
    owner_writer: &mut BitWriter,
    observers_writer: &mut BitWriter,
) -> Result<SerializeCounts, ReplicationError>
where
    I: ExactSizeIterator<Item = &'u (dyn StateUnit + 'static)>,
{
    check_unit_count(object_id, units.len())?;

    let initial = scope.is_initial();
    let mut counts = SerializeCounts::default();

    for (index, unit) in units.enumerate() {
        let index = index as UnitIndex;
        if !scope.includes(index) {
            continue;
        }

        let start = owner_writer.bits_written();
        unit.serialize(owner_writer, initial)
            .map_err(|source| ReplicationError::SerializationFault {
                object_id,
                unit_index: index,
                unit_name: unit.name(),
                source,
            })?;
        let end = owner_writer.bits_written();

        counts.owner_written += 1;
        counts.owner_mask.set_bit(index);

        if unit.sync_mode() == SyncMode::Observers {
            observers_writer.copy_bits_from(owner_writer, start, end);
            counts.observers_written += 1;
            counts.observers_mask.set_bit(index);
        }
    }

    trace!(
        "object {} serialized {} owner / {} observer units",
        object_id,
        counts.owner_written,
        counts.observers_written
    );

    Ok(counts)
}

/// Applies a payload to the receiving object's units.
///
/// Units are visited in ordinal order and only those present in the header's
/// mask read from the payload. Structure is checked before any unit is
/// touched; once units start reading, a failure abandons the rest of the
/// payload, since the offsets of later units can no longer be trusted.
/// Returns the number of units that were applied.
pub fn deserialize_all<'u, I>(
    object_id: ObjectId,
    units: I,
    header: &PayloadHeader,
    payload: &[u8],
) -> Result<usize, ReplicationError>
where
    I: ExactSizeIterator<Item = &'u mut (dyn StateUnit + 'static)>,
{
    let unit_count = units.len();
    check_unit_count(object_id, unit_count)?;

    let mismatch = |detail| ReplicationError::DeserializationMismatch { object_id, detail };

    if let Some(highest) = header.mask.highest() {
        if usize::from(highest) >= unit_count {
            return Err(mismatch(MismatchDetail::UnknownUnit {
                unit_index: highest,
                unit_count,
            }));
        }
    }

    let available_bits = u32::try_from(payload.len())
        .ok()
        .and_then(|bytes| bytes.checked_mul(8))
        .unwrap_or(u32::MAX);
    if header.bit_length > available_bits {
        return Err(mismatch(MismatchDetail::Truncated {
            declared_bits: header.bit_length,
            available_bits,
        }));
    }

    let mut present: Vec<(UnitIndex, &'u mut (dyn StateUnit + 'static))> =
        Vec::with_capacity(unit_count);
    for (index, unit) in units.enumerate() {
        let index = index as UnitIndex;
        if !header.mask.is_set(index) {
            continue;
        }
        if !header.recipient.includes(unit.sync_mode()) {
            return Err(mismatch(MismatchDetail::OwnerUnitInObserversPayload {
                unit_index: index,
            }));
        }
        present.push((index, unit));
    }

    let mut reader = BitReader::with_bit_length(payload, header.bit_length);
    let applied = present.len();

    for (index, unit) in present {
        let unit_name = unit.name();
        unit.deserialize(&mut reader, header.initial)
            .map_err(|source| ReplicationError::DeserializationFault {
                object_id,
                unit_index: index,
                unit_name,
                source,
            })?;
    }

    if reader.bit_position() != header.bit_length {
        return Err(mismatch(MismatchDetail::Length {
            expected_bits: header.bit_length,
            consumed_bits: reader.bit_position(),
        }));
    }

    Ok(applied)
}
