use core_types::{Note, NoteId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const COLLECTION_SCHEMA_VERSION: u32 = 1;

/// On-disk shape of the collection file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionFile {
    pub schema_version: u32,
    /// Highest id ever issued, including ids of notes since removed.
    #[serde(default)]
    pub last_issued_id: NoteId,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl CollectionFile {
    pub fn new(notes: Vec<Note>, last_issued_id: NoteId) -> Self {
        Self {
            schema_version: COLLECTION_SCHEMA_VERSION,
            last_issued_id,
            notes,
        }
    }

    /// Parses either the current envelope or a legacy bare array of notes.
    pub fn parse(raw: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        if value.is_array() {
            let notes: Vec<Note> = serde_json::from_value(value)?;
            let last_issued_id = notes.iter().map(|note| note.id).max().unwrap_or(0);
            return Ok(Self::new(notes, last_issued_id));
        }
        serde_json::from_value(value)
    }

    /// Floor for the next id: nothing at or below it may be issued.
    pub fn id_floor(&self) -> NoteId {
        self.notes
            .iter()
            .map(|note| note.id)
            .max()
            .unwrap_or(0)
            .max(self.last_issued_id)
    }
}
