use std::any::Any;

use replica_shared::{BitReader, BitWrite, StateUnit, SyncMode, SyncVar, UnitError};

/// Two independently tracked text fields
pub struct StringUnit {
    pub title: SyncVar<String>,
    pub body: SyncVar<String>,
    mode: SyncMode,
}

impl StringUnit {
    pub fn new(title: &str, body: &str) -> Self {
        Self {
            title: SyncVar::new(title.to_string()),
            body: SyncVar::new(body.to_string()),
            mode: SyncMode::Observers,
        }
    }

    pub fn owner_only(title: &str, body: &str) -> Self {
        Self {
            mode: SyncMode::Owner,
            ..Self::new(title, body)
        }
    }
}

impl StateUnit for StringUnit {
    fn name(&self) -> &'static str {
        "StringUnit"
    }

    fn sync_mode(&self) -> SyncMode {
        self.mode
    }

    fn dirty_bits(&self) -> u64 {
        self.title.dirty_bit(0) | self.body.dirty_bit(1)
    }

    fn clear_dirty_bits(&mut self) {
        self.title.clear();
        self.body.clear();
    }

    fn serialize(&self, writer: &mut dyn BitWrite, initial: bool) -> Result<(), UnitError> {
        if initial {
            self.title.write(writer);
            self.body.write(writer);
        } else {
            self.title.write_delta(writer);
            self.body.write_delta(writer);
        }
        Ok(())
    }

    fn deserialize(&mut self, reader: &mut BitReader, initial: bool) -> Result<(), UnitError> {
        if initial {
            self.title.read(reader)?;
            self.body.read(reader)?;
        } else {
            self.title.read_delta(reader)?;
            self.body.read_delta(reader)?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
