use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use core_types::{EncryptionState, Note, NoteId, SentimentLabel, TextAnnotator, ValidationError};
use lexicon::HeuristicAnnotator;
use note_store::{
    NewNoteOptions, NoteLookup, NotePatch, NoteStore, SaveOptions, SearchField, SearchOptions,
    StoreError, StoreOptions, StorePaths,
};
use secrets::{BodyCipher, CipherError, KdfParams};
use tempfile::tempdir;

const TRIP: &str = "Excited about the amazing vacation with family in Paris";

fn store(dir: &Path) -> NoteStore {
    NoteStore::new(
        StorePaths::in_dir(dir),
        Arc::new(HeuristicAnnotator::default()),
    )
}

fn cipher(passphrase: &str) -> BodyCipher {
    BodyCipher::with_params(passphrase, KdfParams::minimal()).expect("cipher")
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read collection")
}

#[test]
fn missing_file_is_an_empty_collection() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path());
    assert!(store.load().expect("load").is_empty());
    assert!(store.list_backups().expect("backups").is_empty());
}

#[test]
fn add_then_find_by_title() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path());
    let body = "Pick up  milk\nand bread on the way home";
    let added = store
        .add("Errands", body, NewNoteOptions::default())
        .expect("add");

    let found = store
        .find(&NoteLookup::Title("errands".into()))
        .expect("find")
        .expect("present");
    assert_eq!(found.id, added.id);
    assert_eq!(found.body, body);
    assert_eq!(found.word_count(), 9);
    assert_eq!(found.created_at, found.updated_at);
    assert!(found.has_current_annotation());

    assert_eq!(
        store.find(&NoteLookup::Id(added.id)).expect("find"),
        Some(found)
    );
    assert_eq!(store.find(&NoteLookup::Id(added.id + 1)).expect("find"), None);
}

#[test]
fn trip_note_is_annotated_tagged_and_categorised() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path());
    let note = store
        .add("Trip Plan", TRIP, NewNoteOptions::default())
        .expect("add");

    assert!(["Travel", "Personal"].contains(&note.category.as_str()));
    let annotation = note.annotation.as_ref().expect("annotation");
    assert!(matches!(
        annotation.sentiment.label,
        SentimentLabel::Positive | SentimentLabel::VeryPositive
    ));
    assert_eq!(annotation.topics.places, ["Paris"]);
    assert!(note.tags.contains("short"));
    assert!(note.tags.contains(annotation.sentiment.label.as_str()));
    assert!(note.tags.len() <= 5);
}

#[test]
fn caller_tags_and_category_win_over_inference() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path());
    let note = store
        .add(
            "Trip Plan",
            TRIP,
            NewNoteOptions {
                category: Some("Ideas".into()),
                tags: Some(vec!["summer".into(), "2025".into()]),
                encrypt: None,
            },
        )
        .expect("add");
    assert_eq!(note.category, "Ideas");
    assert_eq!(note.tags.iter().collect::<Vec<_>>(), ["summer", "2025"]);

    let err = store
        .add(
            "Bad Tags",
            "body",
            NewNoteOptions {
                tags: Some(vec!["has space".into()]),
                ..NewNoteOptions::default()
            },
        )
        .expect_err("invalid tag");
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::InvalidTag(_))
    ));
}

#[test]
fn duplicate_title_leaves_collection_unchanged() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path());
    store
        .add("Groceries", "eggs", NewNoteOptions::default())
        .expect("add");
    let before = read(&store.paths().collection);
    let backups_before = store.list_backups().expect("backups").len();

    let err = store
        .add(" GROCERIES ", "more eggs", NewNoteOptions::default())
        .expect_err("duplicate");
    assert!(matches!(err, StoreError::DuplicateTitle(_)));
    assert_eq!(read(&store.paths().collection), before);
    assert_eq!(store.list_backups().expect("backups").len(), backups_before);
    assert_eq!(store.load().expect("load").len(), 1);
}

#[test]
fn invalid_input_is_rejected_before_any_write() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path());
    let err = store
        .add("   ", "body", NewNoteOptions::default())
        .expect_err("blank title");
    assert!(matches!(err, StoreError::Validation(ValidationError::EmptyTitle)));
    let err = store
        .add("Title", "", NewNoteOptions::default())
        .expect_err("empty body");
    assert!(matches!(err, StoreError::Validation(ValidationError::EmptyBody)));
    assert!(!store.paths().collection.exists());
}

#[test]
fn every_write_backs_up_the_previous_file() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path());
    store
        .add("First", "one", NewNoteOptions::default())
        .expect("add");
    assert!(store.list_backups().expect("backups").is_empty());

    let before = read(&store.paths().collection);
    store
        .add("Second", "two", NewNoteOptions::default())
        .expect("add");

    let backups = store.list_backups().expect("backups");
    assert_eq!(backups.len(), 1);
    assert_eq!(read(&backups[0].path), before);
    assert_eq!(backups[0].size, before.len() as u64);
}

#[test]
fn backup_retention_prunes_old_snapshots() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path()).with_options(StoreOptions {
        backup_retention: Some(2),
        ..StoreOptions::default()
    });
    for title in ["a", "b", "c", "d", "e"] {
        store
            .add(title, "body", NewNoteOptions::default())
            .expect("add");
    }
    assert_eq!(store.list_backups().expect("backups").len(), 2);
}

#[test]
fn update_refreshes_annotation_and_timestamps() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path());
    let original = store
        .add("Journal", "A quiet day at home.", NewNoteOptions::default())
        .expect("add");

    let updated = store
        .update(
            original.id,
            NotePatch::body("Terrible news. The project failed and I feel awful."),
        )
        .expect("update");

    assert_eq!(updated.created_at, original.created_at);
    assert!(updated.updated_at > original.updated_at);
    assert_ne!(updated.annotation, original.annotation);
    assert!(updated.has_current_annotation());
    assert_eq!(
        updated.annotation.as_ref().expect("annotation").sentiment.label,
        SentimentLabel::VeryNegative
    );
    assert_eq!(updated.title, original.title);
    assert_eq!(updated.tags, original.tags);

    let reloaded = store
        .find(&NoteLookup::Id(original.id))
        .expect("find")
        .expect("present");
    assert_eq!(reloaded, updated);
}

#[test]
fn update_title_checks_other_notes_only() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path());
    let first = store
        .add("Alpha", "one", NewNoteOptions::default())
        .expect("add");
    store
        .add("Beta", "two", NewNoteOptions::default())
        .expect("add");

    let renamed = store
        .update(first.id, NotePatch::title("ALPHA"))
        .expect("rename to itself");
    assert_eq!(renamed.title, "ALPHA");

    let err = store
        .update(first.id, NotePatch::title("beta"))
        .expect_err("clash");
    assert!(matches!(err, StoreError::DuplicateTitle(_)));

    let err = store
        .update(first.id + 10_000_000, NotePatch::title("Gamma"))
        .expect_err("missing");
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn remove_returns_the_note_and_missing_ids_touch_nothing() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path());
    let note = store
        .add("Temp", "scratch", NewNoteOptions::default())
        .expect("add");
    let before = read(&store.paths().collection);

    let err = store.remove(note.id + 1).expect_err("missing");
    assert!(matches!(err, StoreError::NotFound(id) if id == note.id + 1));
    assert!(store.list_backups().expect("backups").is_empty());
    assert_eq!(read(&store.paths().collection), before);

    let removed = store.remove(note.id).expect("remove");
    assert_eq!(removed.id, note.id);
    assert!(store.load().expect("load").is_empty());
    assert_eq!(store.list_backups().expect("backups").len(), 1);
}

#[test]
fn ids_are_not_reused_after_removal() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path());
    let first = store
        .add("One", "body", NewNoteOptions::default())
        .expect("add");
    store.remove(first.id).expect("remove");
    let second = store
        .add("Two", "body", NewNoteOptions::default())
        .expect("add");
    assert!(second.id > first.id);
}

#[test]
fn corrupt_collection_fails_closed() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path());
    fs::write(&store.paths().collection, "{ not json").expect("seed");

    assert!(matches!(
        store.load().expect_err("corrupt"),
        StoreError::CorruptCollection { .. }
    ));
    assert!(matches!(
        store
            .add("New", "body", NewNoteOptions::default())
            .expect_err("corrupt"),
        StoreError::CorruptCollection { .. }
    ));
    assert_eq!(read(&store.paths().collection), "{ not json");
}

#[test]
fn legacy_array_files_load() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path());
    let note = Note::new(42, "Legacy", "from an older version");
    fs::write(
        &store.paths().collection,
        serde_json::to_string(&vec![note]).expect("serialize"),
    )
    .expect("seed");

    let notes = store.load().expect("load");
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, 42);
    assert!(notes[0].has_current_annotation());
}

#[test]
fn encrypted_bodies_roundtrip_and_never_hit_disk() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path()).with_cipher(cipher("correct horse"));
    let note = store
        .add(
            "Diary",
            TRIP,
            NewNoteOptions {
                encrypt: Some(true),
                ..NewNoteOptions::default()
            },
        )
        .expect("add");
    assert_eq!(note.encryption, EncryptionState::Encrypted);

    let raw = read(&store.paths().collection);
    assert!(!raw.contains(TRIP));
    assert!(!raw.contains("amazing"));

    let loaded = store.load().expect("load");
    assert_eq!(loaded[0].body, TRIP);
    assert!(loaded[0].has_current_annotation());

    // A fresh instance with the same passphrase derives its own salt but can still read.
    let reopened = self::store(dir.path()).with_cipher(cipher("correct horse"));
    assert_eq!(reopened.load().expect("load")[0].body, TRIP);
}

#[test]
fn wrong_or_missing_key_is_a_decryption_error() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path()).with_cipher(cipher("right"));
    store
        .add(
            "Secret",
            "launch codes",
            NewNoteOptions {
                encrypt: Some(true),
                ..NewNoteOptions::default()
            },
        )
        .expect("add");

    let wrong = self::store(dir.path()).with_cipher(cipher("wrong"));
    assert!(matches!(
        wrong.load().expect_err("wrong key"),
        StoreError::Decryption(CipherError::Decrypt)
    ));

    let keyless = self::store(dir.path());
    assert!(matches!(
        keyless.load().expect_err("no key"),
        StoreError::Decryption(CipherError::MissingKey)
    ));
}

#[test]
fn encrypting_without_a_key_fails_before_writing() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path()).with_options(StoreOptions {
        encrypt_by_default: true,
        ..StoreOptions::default()
    });
    let err = store
        .add("Secret", "body", NewNoteOptions::default())
        .expect_err("no key");
    assert!(matches!(
        err,
        StoreError::Encryption {
            source: CipherError::MissingKey,
            ..
        }
    ));
    assert!(!store.paths().collection.exists());
}

#[test]
fn save_with_encrypt_marks_every_note() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path()).with_cipher(cipher("pass"));
    store
        .add("One", "first body", NewNoteOptions::default())
        .expect("add");
    store
        .add("Two", "second body", NewNoteOptions::default())
        .expect("add");

    let notes = store.load().expect("load");
    let backup = store
        .save(&notes, SaveOptions { encrypt: true })
        .expect("save");
    assert!(backup.is_some());

    let raw = read(&store.paths().collection);
    assert!(!raw.contains("first body"));
    let reloaded = store.load().expect("load");
    assert!(reloaded.iter().all(|note| note.encryption.is_encrypted()));
    assert_eq!(reloaded[1].body, "second body");

    // Plain saves keep already encrypted notes encrypted.
    store
        .save(&reloaded, SaveOptions::default())
        .expect("save");
    assert!(!read(&store.paths().collection).contains("first body"));
}

#[test]
fn save_rejects_duplicate_titles() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path());
    let a = Note::new(1, "Same", "a");
    let b = Note::new(2, "same", "b");
    assert!(matches!(
        store.save(&[a, b], SaveOptions::default()),
        Err(StoreError::DuplicateTitle(_))
    ));
    assert!(!store.paths().collection.exists());
}

#[test]
fn search_honours_fields_and_case() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path());
    store
        .add("Trip Plan", TRIP, NewNoteOptions::default())
        .expect("add");
    store
        .add("Paris Budget", "Hotel costs", NewNoteOptions::default())
        .expect("add");

    let hits = store
        .search("paris", &SearchOptions::default())
        .expect("search");
    let titles: Vec<_> = hits.iter().map(|note| note.title.as_str()).collect();
    assert_eq!(titles, ["Trip Plan", "Paris Budget"]);

    let title_only = SearchOptions {
        fields: vec![SearchField::Title],
        case_sensitive: true,
    };
    let hits = store.search("Paris", &title_only).expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Paris Budget");
    assert!(store.search("paris", &title_only).expect("search").is_empty());
}

#[test]
fn similar_notes_rank_shared_context() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path());
    let trip = store
        .add("Trip Plan", TRIP, NewNoteOptions::default())
        .expect("add");
    let dinner = store
        .add(
            "Dinner",
            "Dinner with family in Paris was lovely",
            NewNoteOptions::default(),
        )
        .expect("add");
    store
        .add(
            "Taxes",
            "File the forms",
            NewNoteOptions {
                category: Some("Finance".into()),
                tags: Some(vec!["money".into()]),
                encrypt: None,
            },
        )
        .expect("add");

    let similar = store.similar_to(trip.id, 5).expect("similar");
    let ids: Vec<_> = similar.iter().map(|hit| hit.note.id).collect();
    assert_eq!(ids, [dinner.id]);
    assert!(similar[0].score > 0.1);

    assert!(matches!(
        store.similar_to(trip.id + 10_000_000, 5),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn restore_brings_back_a_snapshot_and_backs_up_current_state() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path());
    let first = store
        .add("First", "one", NewNoteOptions::default())
        .expect("add");
    let second = store
        .add("Second", "two", NewNoteOptions::default())
        .expect("add");

    let snapshot = store.list_backups().expect("backups").remove(0);
    let created = store.restore_backup(&snapshot.path).expect("restore");
    assert!(created.is_some());

    let notes = store.load().expect("load");
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, first.id);
    assert_eq!(store.list_backups().expect("backups").len(), 2);

    // The id of the note that only existed after the snapshot is not reissued.
    let third = store
        .add("Third", "three", NewNoteOptions::default())
        .expect("add");
    assert!(third.id > second.id);
}

#[test]
fn restore_rejects_unparseable_snapshots() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path());
    store
        .add("Keep", "me", NewNoteOptions::default())
        .expect("add");
    let before = read(&store.paths().collection);

    let bogus = dir.path().join("bogus.json");
    fs::write(&bogus, "[{]").expect("seed");
    assert!(matches!(
        store.restore_backup(&bogus).expect_err("corrupt"),
        StoreError::CorruptCollection { .. }
    ));
    assert_eq!(read(&store.paths().collection), before);
}

#[test]
fn save_recomputes_hand_edited_annotations() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path());
    let body = "Excited about the amazing vacation";
    store
        .add("Trip", body, NewNoteOptions::default())
        .expect("add");

    let mut notes = store.load().expect("load");
    let annotation = notes[0].annotation.as_mut().expect("annotation");
    annotation.word_count = 999;
    annotation.sentiment.score = -42;
    store
        .save(&notes, SaveOptions::default())
        .expect("save");

    let reloaded = store.load().expect("load");
    let annotation = reloaded[0].annotation.as_ref().expect("annotation");
    assert_eq!(annotation.word_count, 5);
    assert_eq!(annotation, &HeuristicAnnotator::default().annotate(body));
}

#[test]
fn failed_write_leaves_the_live_file_intact() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path());
    store
        .add("First", "one", NewNoteOptions::default())
        .expect("add");
    let before = read(&store.paths().collection);

    // A regular file where the backup directory should be.
    fs::write(&store.paths().backups, "not a directory").expect("block backups");
    let err = store
        .add("Second", "two", NewNoteOptions::default())
        .expect_err("backup dir is a file");
    assert!(matches!(err, StoreError::StorageWrite { .. }), "unexpected error: {err}");
    assert_eq!(read(&store.paths().collection), before);
    assert_eq!(store.load().expect("load").len(), 1);
}

#[test]
fn unreadable_collection_is_storage_unavailable() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path());
    fs::create_dir(&store.paths().collection).expect("directory in place of file");

    assert!(matches!(
        store.load().expect_err("directory"),
        StoreError::StorageUnavailable { .. }
    ));
}

#[test]
fn concurrent_writers_are_serialised() {
    const WRITERS: usize = 8;
    let dir = tempdir().expect("tempdir");
    let store = Arc::new(store(dir.path()));

    std::thread::scope(|scope| {
        for i in 0..WRITERS {
            let store = Arc::clone(&store);
            scope.spawn(move || {
                store
                    .add(&format!("Note {i}"), "written in parallel", NewNoteOptions::default())
                    .expect("add");
            });
        }
    });

    let notes = store.load().expect("load");
    assert_eq!(notes.len(), WRITERS);
    let ids: HashSet<NoteId> = notes.iter().map(|note| note.id).collect();
    assert_eq!(ids.len(), WRITERS);
    assert_eq!(store.list_backups().expect("backups").len(), WRITERS - 1);
}

#[test]
fn exhausted_id_space_is_reported_not_panicked() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path());
    let raw = serde_json::to_string(&vec![Note::new(NoteId::MAX, "Last", "the end")])
        .expect("serialize");
    fs::write(&store.paths().collection, &raw).expect("seed");

    let err = store
        .add("Next", "body", NewNoteOptions::default())
        .expect_err("no id left");
    assert!(matches!(err, StoreError::CorruptCollection { .. }));
    assert_eq!(read(&store.paths().collection), raw);
}

#[test]
fn numeric_keys_fall_back_to_titles() {
    let dir = tempdir().expect("tempdir");
    let store = store(dir.path());
    let year = store
        .add("2024", "annual review", NewNoteOptions::default())
        .expect("add");
    let other = store
        .add("Other", "something else", NewNoteOptions::default())
        .expect("add");

    let found = store.find_by_key("2024").expect("find").expect("by title");
    assert_eq!(found.id, year.id);
    let found = store
        .find_by_key(&other.id.to_string())
        .expect("find")
        .expect("by id");
    assert_eq!(found.id, other.id);
    assert_eq!(store.find_by_key("missing").expect("find"), None);
}
