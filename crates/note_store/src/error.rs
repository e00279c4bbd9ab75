use std::io;
use std::path::PathBuf;

use core_types::{NoteId, ValidationError};
use secrets::CipherError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a note titled `{0}` already exists")]
    DuplicateTitle(String),

    #[error("note id {0} appears more than once")]
    DuplicateId(NoteId),

    #[error("note {0} not found")]
    NotFound(NoteId),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("storage unavailable at {path:?}: {source}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path:?}: {source}")]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("collection file {path:?} is corrupt: {source}")]
    CorruptCollection {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Decryption(#[from] CipherError),

    #[error("failed to encrypt note {id}: {source}")]
    Encryption {
        id: NoteId,
        #[source]
        source: CipherError,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;
