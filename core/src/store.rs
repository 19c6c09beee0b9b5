//! Save-file persistence.
//!
//! RULE: Only store.rs touches the filesystem. The engine hands encoded
//! snapshots over — it never reads or writes paths itself.
//!
//! Writes go through a temp file and a rename so a crash mid-write never
//! leaves a truncated save. A failed write is reported to the caller and
//! logged; the caller retries on its next save interval — in-memory state
//! is unaffected either way.

use crate::error::{GameError, GameResult};
use crate::snapshot::SaveSnapshot;
use std::fs;
use std::path::{Path, PathBuf};

pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, snapshot: &SaveSnapshot) -> GameResult<()> {
        let text = snapshot.encode()?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text.as_bytes())?;
        fs::rename(&tmp, &self.path)?;
        log::debug!("snapshot written to {}", self.path.display());
        Ok(())
    }

    /// Read and decode the persisted snapshot. `SaveNotFound` when no
    /// file exists; `SaveCorrupt` when it exists but does not validate.
    pub fn read(&self) -> GameResult<SaveSnapshot> {
        if !self.path.exists() {
            return Err(GameError::SaveNotFound);
        }
        let text = fs::read_to_string(&self.path)?;
        SaveSnapshot::decode(&text)
    }

    /// Remove the persisted snapshot (full reset). Missing file is fine.
    pub fn wipe(&self) -> GameResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
