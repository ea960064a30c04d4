//! Primary/backup synchronization
//!
//! Every write lands in both locations with identical bytes. The dual write
//! is not atomic: if the process dies between the two sides they diverge
//! until the next integrity check and repair.

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::{ArchiveError, ArchiveResult};
use crate::models::{Location, Snapshot};
use crate::storage::snapshot_store::decode;
use crate::storage::SnapshotStore;

/// Paths written by a successful dual write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedWrite {
    pub primary: PathBuf,
    pub backup: PathBuf,
}

/// Mirrors writes into the backup location and restores from it
#[derive(Debug, Clone)]
pub struct BackupSynchronizer {
    primary: SnapshotStore,
    backup: SnapshotStore,
}

impl BackupSynchronizer {
    /// Create a new synchronizer over two directories
    pub fn new(primary_dir: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            primary: SnapshotStore::new(primary_dir, Location::Primary),
            backup: SnapshotStore::new(backup_dir, Location::Backup),
        }
    }

    /// Primary store
    pub fn primary(&self) -> &SnapshotStore {
        &self.primary
    }

    /// Backup store
    pub fn backup(&self) -> &SnapshotStore {
        &self.backup
    }

    /// Store for a given location
    pub fn store(&self, location: Location) -> &SnapshotStore {
        match location {
            Location::Primary => &self.primary,
            Location::Backup => &self.backup,
        }
    }

    /// Write a snapshot to primary and backup
    ///
    /// The payload is serialized once and the same bytes are written to both
    /// sides, primary first. If a side fails the error names it and the other
    /// side keeps whatever it already has.
    pub fn write_with_backup(
        &self,
        date: NaiveDate,
        snapshot: &Snapshot,
        compressed: bool,
    ) -> ArchiveResult<SyncedWrite> {
        let bytes = SnapshotStore::encode(snapshot, compressed)?;

        let primary = self
            .primary
            .write_bytes(date, &bytes, compressed)
            .map_err(|e| side_error(Location::Primary, e))?;

        let backup = self
            .backup
            .write_bytes(date, &bytes, compressed)
            .map_err(|e| side_error(Location::Backup, e))?;

        info!(%date, compressed, "archived snapshot with backup");
        Ok(SyncedWrite { primary, backup })
    }

    /// Copy the backup blob verbatim over the primary blob for `date`
    ///
    /// The backup must decode and validate first; a corrupt backup is never
    /// copied and the primary is left as it was.
    pub fn restore(&self, date: NaiveDate) -> ArchiveResult<PathBuf> {
        let (entry, bytes) = self.backup.read_raw(date)?;
        decode(&entry.path, &bytes, entry.compressed)?
            .validate()
            .map_err(|e| ArchiveError::corruption(&entry.path, e.to_string()))?;

        let path = self.primary.write_bytes(date, &bytes, entry.compressed)?;

        info!(%date, path = %path.display(), "restored primary from backup");
        Ok(path)
    }
}

fn side_error(location: Location, source: ArchiveError) -> ArchiveError {
    warn!(%location, error = %source, "dual write failed");
    ArchiveError::SideWrite {
        location,
        source: Box::new(source),
    }
}
