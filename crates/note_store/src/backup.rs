//! Timestamped copies of the collection file, taken before every write.
//!
//! Snapshots are named `<stem>-<YYYYMMDDTHHMMSS.mmm>Z.json`; a `-<n>` suffix
//! is added when two snapshots land in the same millisecond.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::Serialize;
use tracing::{info, warn};

const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%.3f";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupSnapshot {
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub size: u64,
    #[serde(skip)]
    seq: u32,
}

fn stem_of(collection: &Path) -> String {
    collection
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "collection".to_string())
}

fn file_name(stem: &str, at: DateTime<Utc>, seq: u32) -> String {
    let stamp = at.format(TIMESTAMP_FORMAT);
    if seq == 0 {
        format!("{stem}-{stamp}Z.json")
    } else {
        format!("{stem}-{stamp}Z-{seq}.json")
    }
}

fn parse_name(stem: &str, name: &str) -> Option<(DateTime<Utc>, u32)> {
    let rest = name.strip_prefix(stem)?.strip_prefix('-')?;
    let rest = rest.strip_suffix(".json")?;
    let (stamp, seq) = rest.split_once('Z')?;
    let seq = match seq {
        "" => 0,
        counter => counter.strip_prefix('-')?.parse().ok()?,
    };
    let naive = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;
    Some((naive.and_utc(), seq))
}

/// Copies `collection` into `backup_dir`. Returns `None` when there is no
/// collection file yet.
pub fn create(
    collection: &Path,
    backup_dir: &Path,
    now: DateTime<Utc>,
) -> io::Result<Option<BackupSnapshot>> {
    if !collection.exists() {
        return Ok(None);
    }
    fs::create_dir_all(backup_dir)?;

    let stem = stem_of(collection);
    let now = now.trunc_subsecs(3);
    let mut seq = 0;
    let mut path = backup_dir.join(file_name(&stem, now, seq));
    while path.exists() {
        seq += 1;
        path = backup_dir.join(file_name(&stem, now, seq));
    }

    let size = fs::copy(collection, &path)?;
    info!(path = %path.display(), size, "created collection backup");

    Ok(Some(BackupSnapshot {
        path,
        created_at: now,
        size,
        seq,
    }))
}

/// Snapshots of `collection` in `backup_dir`, newest first. Unrelated files are ignored.
pub fn list(collection: &Path, backup_dir: &Path) -> io::Result<Vec<BackupSnapshot>> {
    let entries = match fs::read_dir(backup_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let stem = stem_of(collection);
    let mut snapshots = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some((created_at, seq)) = parse_name(&stem, &name.to_string_lossy()) else {
            continue;
        };
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        snapshots.push(BackupSnapshot {
            path: entry.path(),
            created_at,
            size: metadata.len(),
            seq,
        });
    }

    snapshots.sort_by(|a, b| (b.created_at, b.seq).cmp(&(a.created_at, a.seq)));
    Ok(snapshots)
}

/// Deletes all but the newest `retain` snapshots. Failures are logged, not returned.
pub fn prune(collection: &Path, backup_dir: &Path, retain: usize) -> usize {
    let snapshots = match list(collection, backup_dir) {
        Ok(snapshots) => snapshots,
        Err(e) => {
            warn!(dir = %backup_dir.display(), error = %e, "failed to list backups for pruning");
            return 0;
        }
    };

    let mut removed = 0;
    for snapshot in snapshots.iter().skip(retain) {
        match fs::remove_file(&snapshot.path) {
            Ok(()) => removed += 1,
            Err(e) => {
                warn!(path = %snapshot.path.display(), error = %e, "failed to prune backup")
            }
        }
    }
    removed
}
