//! Durable, optionally encrypted note collection with automatic backups.

pub mod backup;
pub mod document;
pub mod error;
pub mod query;
pub mod store;

pub use backup::BackupSnapshot;
pub use document::{COLLECTION_SCHEMA_VERSION, CollectionFile};
pub use error::{StoreError, StoreResult};
pub use query::{
    NewNoteOptions, NoteLookup, NotePatch, SaveOptions, SearchField, SearchOptions, SimilarNote,
};
pub use store::{DEFAULT_BACKUP_DIR, DEFAULT_COLLECTION_FILE, NoteStore, StoreOptions, StorePaths};
