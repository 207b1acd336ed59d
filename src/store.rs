//! File-backed snapshot persistence

use crate::{error::PersistenceError, snapshot::Snapshot, types::SnapshotEntry};
use std::fs;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Persists the snapshot as a JSON array of entries
///
/// Writes go to a temporary file in the same directory which is synced and
/// then renamed over the target, so a crash mid-write leaves either the old
/// or the new snapshot on disk, never a truncated one.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted snapshot, `None` if nothing has been saved yet
    pub fn load(&self) -> Result<Option<Snapshot>, PersistenceError> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let entries: Vec<SnapshotEntry> = serde_json::from_reader(BufReader::new(file))?;
        if entries.is_empty() {
            return Ok(None);
        }

        Ok(Some(Snapshot::from_entries(entries)?))
    }

    /// Atomically replaces the persisted snapshot
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, snapshot.entries())?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;

        tracing::debug!(path = %self.path.display(), entries = snapshot.len(), "Saved snapshot");
        Ok(())
    }

    /// Removes the persisted snapshot so the next start takes a new baseline
    pub fn clear(&self) -> Result<(), PersistenceError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
