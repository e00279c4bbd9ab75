use std::collections::HashSet;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use core_types::{
    EncryptionState, MAX_TAGS, Note, NoteId, TagSet, TextAnnotator, is_valid_tag, validate_body,
    validate_tags, validate_title,
};
use parking_lot::RwLock;
use serde::de::Error as _;
use secrets::{BodyCipher, CipherError};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::backup::{self, BackupSnapshot};
use crate::document::CollectionFile;
use crate::error::{StoreError, StoreResult};
use crate::query::{NewNoteOptions, NoteLookup, NotePatch, SaveOptions, SearchOptions, SimilarNote};

pub const DEFAULT_COLLECTION_FILE: &str = "notes.json";
pub const DEFAULT_BACKUP_DIR: &str = "backups";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub collection: PathBuf,
    pub backups: PathBuf,
}

impl StorePaths {
    pub fn new(collection: impl Into<PathBuf>, backups: impl Into<PathBuf>) -> Self {
        Self {
            collection: collection.into(),
            backups: backups.into(),
        }
    }

    /// `<dir>/notes.json` with snapshots under `<dir>/backups`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(DEFAULT_COLLECTION_FILE), dir.join(DEFAULT_BACKUP_DIR))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    pub encrypt_by_default: bool,
    /// Keep only the newest N backups after each write. `None` keeps all.
    pub backup_retention: Option<usize>,
}

/// File-backed note collection.
///
/// Every mutation rewrites the whole collection: back up the current file,
/// write a temporary sibling, fsync, then rename over the live file.
pub struct NoteStore {
    paths: StorePaths,
    cipher: Option<BodyCipher>,
    annotator: Arc<dyn TextAnnotator>,
    options: StoreOptions,
    lock: RwLock<()>,
}

impl NoteStore {
    pub fn new(paths: StorePaths, annotator: Arc<dyn TextAnnotator>) -> Self {
        Self {
            paths,
            cipher: None,
            annotator,
            options: StoreOptions::default(),
            lock: RwLock::new(()),
        }
    }

    pub fn with_cipher(mut self, cipher: BodyCipher) -> Self {
        self.cipher = Some(cipher);
        self
    }

    pub fn with_options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    /// All notes with bodies decrypted and annotations current.
    pub fn load(&self) -> StoreResult<Vec<Note>> {
        let _guard = self.lock.read();
        Ok(self.load_unlocked()?.0)
    }

    /// Replaces the whole collection.
    pub fn save(&self, notes: &[Note], options: SaveOptions) -> StoreResult<Option<BackupSnapshot>> {
        let _guard = self.lock.write();

        let mut ids = HashSet::new();
        for (idx, note) in notes.iter().enumerate() {
            validate_title(&note.title)?;
            validate_body(&note.body)?;
            validate_tags(&note.tags)?;
            if !ids.insert(note.id) {
                return Err(StoreError::DuplicateId(note.id));
            }
            if notes[..idx].iter().any(|other| other.title_matches(&note.title)) {
                return Err(StoreError::DuplicateTitle(note.title.clone()));
            }
        }

        let floor = match self.read_file() {
            Ok(file) => file.map(|file| file.id_floor()).unwrap_or(0),
            Err(e) => {
                warn!(error = %e, "replacing unreadable collection");
                0
            }
        };
        let last_issued_id = notes.iter().map(|note| note.id).fold(floor, NoteId::max);
        self.write_unlocked(notes, last_issued_id, options.encrypt)
    }

    pub fn add(
        &self,
        title: &str,
        body: &str,
        options: NewNoteOptions,
    ) -> StoreResult<Note> {
        let _guard = self.lock.write();

        let title = title.trim();
        validate_title(title)?;
        validate_body(body)?;
        let tags = supplied_tags(options.tags)?;

        let (mut notes, floor) = self.load_unlocked()?;
        if notes.iter().any(|note| note.title_matches(title)) {
            return Err(StoreError::DuplicateTitle(title.to_string()));
        }

        let now = Utc::now();
        let id = next_id(floor, now)
            .ok_or_else(|| self.corrupt(format!("no id left after {floor}")))?;
        let mut note = Note::new(id, title, body);
        note.created_at = now;
        note.updated_at = now;
        note.annotation = Some(self.annotator.annotate(body));
        note.tags = tags.unwrap_or_else(|| self.inferred_tags(body));
        note.category = supplied_category(options.category)
            .unwrap_or_else(|| self.annotator.suggest_category(body));
        if options.encrypt.unwrap_or(self.options.encrypt_by_default) {
            note.encryption = EncryptionState::Encrypted;
        }

        notes.push(note.clone());
        self.write_unlocked(&notes, id, false)?;
        info!(id, encrypted = note.encryption.is_encrypted(), "added note");
        Ok(note)
    }

    pub fn update(&self, id: NoteId, patch: NotePatch) -> StoreResult<Note> {
        let _guard = self.lock.write();

        let (mut notes, floor) = self.load_unlocked()?;
        let idx = notes
            .iter()
            .position(|note| note.id == id)
            .ok_or(StoreError::NotFound(id))?;

        if let Some(title) = &patch.title {
            let title = title.trim();
            validate_title(title)?;
            if notes
                .iter()
                .any(|other| other.id != id && other.title_matches(title))
            {
                return Err(StoreError::DuplicateTitle(title.to_string()));
            }
        }
        if let Some(body) = &patch.body {
            validate_body(body)?;
        }
        let tags = patch.tags.map(|tags| supplied_tags(Some(tags))).transpose()?;

        let note = &mut notes[idx];
        if let Some(title) = patch.title {
            note.title = title.trim().to_string();
        }
        if let Some(body) = patch.body {
            note.annotation = Some(self.annotator.annotate(&body));
            note.body = body;
        }
        if let Some(category) = patch.category {
            note.category = supplied_category(Some(category))
                .unwrap_or_else(|| self.annotator.suggest_category(&note.body));
        }
        if let Some(tags) = tags {
            // An empty list asks for fresh inferred tags.
            note.tags = tags.unwrap_or_else(|| self.inferred_tags(&note.body));
        }
        if let Some(encrypt) = patch.encrypt {
            note.encryption = if encrypt {
                EncryptionState::Encrypted
            } else {
                EncryptionState::Plain
            };
        }
        note.updated_at = advance(note.updated_at, Utc::now()).ok_or_else(|| {
            self.corrupt(format!("note {id} has an out of range updated_at"))
        })?;

        let updated = note.clone();
        self.write_unlocked(&notes, floor, false)?;
        info!(id, "updated note");
        Ok(updated)
    }

    pub fn remove(&self, id: NoteId) -> StoreResult<Note> {
        let _guard = self.lock.write();

        let (mut notes, floor) = self.load_unlocked()?;
        let idx = notes
            .iter()
            .position(|note| note.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let removed = notes.remove(idx);

        self.write_unlocked(&notes, floor, false)?;
        info!(id, "removed note");
        Ok(removed)
    }

    pub fn find(&self, lookup: &NoteLookup) -> StoreResult<Option<Note>> {
        Ok(self.load()?.into_iter().find(|note| lookup.matches(note)))
    }

    /// Id lookup for numeric keys, falling back to a title lookup when no id matches.
    pub fn find_by_key(&self, key: &str) -> StoreResult<Option<Note>> {
        let notes = self.load()?;
        let key = key.trim();
        let by_id = key
            .parse::<NoteId>()
            .ok()
            .and_then(|id| notes.iter().position(|note| note.id == id));
        let idx = by_id.or_else(|| notes.iter().position(|note| note.title_matches(key)));
        Ok(idx.map(|idx| notes[idx].clone()))
    }

    /// Notes containing `query` in any of the requested fields, in collection order.
    pub fn search(&self, query: &str, options: &SearchOptions) -> StoreResult<Vec<Note>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|note| options.matches(note, query))
            .collect())
    }

    pub fn similar_to(&self, id: NoteId, limit: usize) -> StoreResult<Vec<SimilarNote>> {
        let notes = self.load()?;
        let target = notes
            .iter()
            .find(|note| note.id == id)
            .ok_or(StoreError::NotFound(id))?;

        Ok(lexicon::find_similar(target, &notes, limit)
            .into_iter()
            .map(|scored| SimilarNote {
                note: scored.note.clone(),
                score: scored.score,
            })
            .collect())
    }

    pub fn list_backups(&self) -> StoreResult<Vec<BackupSnapshot>> {
        let _guard = self.lock.read();
        backup::list(&self.paths.collection, &self.paths.backups).map_err(|source| {
            StoreError::StorageUnavailable {
                path: self.paths.backups.clone(),
                source,
            }
        })
    }

    /// Replaces the live collection with a snapshot. The snapshot must parse
    /// and decrypt before anything is touched; the current file is backed up
    /// like any other write.
    pub fn restore_backup(&self, snapshot: &Path) -> StoreResult<Option<BackupSnapshot>> {
        let _guard = self.lock.write();

        let raw = fs::read_to_string(snapshot).map_err(|source| StoreError::StorageUnavailable {
            path: snapshot.to_path_buf(),
            source,
        })?;
        let file = CollectionFile::parse(&raw).map_err(|source| StoreError::CorruptCollection {
            path: snapshot.to_path_buf(),
            source,
        })?;
        let snapshot_floor = file.id_floor();
        let notes = self.open(file)?;

        let current_floor = match self.read_file() {
            Ok(current) => current.map(|current| current.id_floor()).unwrap_or(0),
            Err(e) => {
                warn!(error = %e, "restoring over unreadable collection");
                0
            }
        };

        let created = self.write_unlocked(&notes, snapshot_floor.max(current_floor), false)?;
        info!(snapshot = %snapshot.display(), notes = notes.len(), "restored backup");
        Ok(created)
    }

    /// A collection whose contents parse but cannot be carried forward.
    fn corrupt(&self, reason: String) -> StoreError {
        StoreError::CorruptCollection {
            path: self.paths.collection.clone(),
            source: serde_json::Error::custom(reason),
        }
    }

    fn inferred_tags(&self, body: &str) -> TagSet {
        self.annotator
            .suggest_tags(body)
            .into_iter()
            .filter(|tag| is_valid_tag(tag))
            .take(MAX_TAGS)
            .collect()
    }

    fn read_file(&self) -> StoreResult<Option<CollectionFile>> {
        let path = &self.paths.collection;
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::StorageUnavailable {
                    path: path.clone(),
                    source,
                });
            }
        };

        CollectionFile::parse(&raw)
            .map(Some)
            .map_err(|source| StoreError::CorruptCollection {
                path: path.clone(),
                source,
            })
    }

    fn load_unlocked(&self) -> StoreResult<(Vec<Note>, NoteId)> {
        let Some(file) = self.read_file()? else {
            debug!(path = %self.paths.collection.display(), "no collection file yet");
            return Ok((Vec::new(), 0));
        };
        let floor = file.id_floor();
        let notes = self.open(file)?;
        debug!(count = notes.len(), "loaded notes");
        Ok((notes, floor))
    }

    /// Decrypts bodies and refreshes stale annotations. Fails as a whole.
    fn open(&self, file: CollectionFile) -> StoreResult<Vec<Note>> {
        file.notes
            .into_iter()
            .map(|mut note| -> StoreResult<Note> {
                if note.encryption.is_encrypted() {
                    let cipher = self.cipher.as_ref().ok_or(CipherError::MissingKey)?;
                    note.body = cipher.decrypt(&note.body)?;
                }
                if !note.has_current_annotation() {
                    note.annotation = Some(self.annotator.annotate(&note.body));
                }
                Ok(note)
            })
            .collect()
    }

    /// On-disk form: encrypted bodies become envelopes and lose their annotation.
    fn seal(&self, notes: &[Note], encrypt_all: bool) -> StoreResult<Vec<Note>> {
        notes
            .iter()
            .map(|note| -> StoreResult<Note> {
                let mut sealed = note.clone();
                if encrypt_all {
                    sealed.encryption = EncryptionState::Encrypted;
                }

                if sealed.encryption.is_encrypted() {
                    let cipher = self.cipher.as_ref().ok_or(StoreError::Encryption {
                        id: note.id,
                        source: CipherError::MissingKey,
                    })?;
                    sealed.body = cipher
                        .encrypt(&note.body)
                        .map_err(|source| StoreError::Encryption { id: note.id, source })?;
                    sealed.annotation = None;
                } else {
                    // Callers of `save` hold public fields; never trust a supplied annotation.
                    sealed.annotation = Some(self.annotator.annotate(&sealed.body));
                }
                Ok(sealed)
            })
            .collect()
    }

    fn write_unlocked(
        &self,
        notes: &[Note],
        last_issued_id: NoteId,
        encrypt_all: bool,
    ) -> StoreResult<Option<BackupSnapshot>> {
        let sealed = self.seal(notes, encrypt_all)?;

        let snapshot = backup::create(&self.paths.collection, &self.paths.backups, Utc::now())
            .map_err(|source| StoreError::StorageWrite {
                path: self.paths.backups.clone(),
                source,
            })?;

        let file = CollectionFile::new(sealed, last_issued_id);
        write_atomic(&self.paths.collection, &file).map_err(|source| StoreError::StorageWrite {
            path: self.paths.collection.clone(),
            source,
        })?;
        info!(
            path = %self.paths.collection.display(),
            count = file.notes.len(),
            "persisted note collection"
        );

        if let Some(retain) = self.options.backup_retention {
            let pruned = backup::prune(&self.paths.collection, &self.paths.backups, retain);
            if pruned > 0 {
                debug!(pruned, retain, "pruned old backups");
            }
        }
        Ok(snapshot)
    }
}

fn write_atomic(path: &Path, file: &CollectionFile) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, file)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Millisecond timestamp, bumped past everything issued before.
/// `None` once the id space is exhausted.
fn next_id(floor: NoteId, now: DateTime<Utc>) -> Option<NoteId> {
    Some(now.timestamp_millis().max(floor.checked_add(1)?))
}

fn advance(previous: DateTime<Utc>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    Some(now.max(previous.checked_add_signed(Duration::milliseconds(1))?))
}

/// `None` when the caller gave no usable tags.
fn supplied_tags(tags: Option<Vec<String>>) -> StoreResult<Option<TagSet>> {
    let tags: TagSet = tags
        .into_iter()
        .flatten()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();
    if tags.is_empty() {
        return Ok(None);
    }
    validate_tags(&tags)?;
    Ok(Some(tags))
}

fn supplied_category(category: Option<String>) -> Option<String> {
    category
        .map(|category| category.trim().to_string())
        .filter(|category| !category.is_empty())
}
