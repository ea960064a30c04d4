//! Snapshot store for a single archive location
//!
//! Validates, (de)compresses and persists one dated document per file in a
//! directory. A store never looks outside its own directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{ArchiveError, ArchiveResult};
use crate::models::{entry_file_name, ArchiveEntry, Location, Snapshot};

use super::file_io::{ensure_dir, gzip_decode, gzip_encode, read_bytes, write_bytes_atomic};

/// Reads and writes snapshot files in one directory
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
    location: Location,
}

impl SnapshotStore {
    /// Create a store rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>, location: Location) -> Self {
        Self {
            dir: dir.into(),
            location,
        }
    }

    /// Directory this store owns
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Which side of the archive this store is
    pub fn location(&self) -> Location {
        self.location
    }

    /// Path a date would be stored at
    pub fn path_for(&self, date: NaiveDate, compressed: bool) -> PathBuf {
        self.dir.join(entry_file_name(date, compressed))
    }

    /// Validate and serialize a snapshot into its stored byte form
    ///
    /// The canonical text form is 2-space pretty JSON.
    pub fn encode(snapshot: &Snapshot, compressed: bool) -> ArchiveResult<Vec<u8>> {
        snapshot
            .validate()
            .map_err(|e| ArchiveError::Validation(e.to_string()))?;

        let json = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| ArchiveError::Json(format!("Failed to serialize snapshot: {}", e)))?;

        if compressed {
            gzip_encode(&json)
        } else {
            Ok(json)
        }
    }

    /// Validate, serialize and persist a snapshot for `date`
    pub fn write(
        &self,
        date: NaiveDate,
        snapshot: &Snapshot,
        compressed: bool,
    ) -> ArchiveResult<PathBuf> {
        let bytes = Self::encode(snapshot, compressed)?;
        self.write_bytes(date, &bytes, compressed)
    }

    /// Persist an already encoded blob for `date`
    ///
    /// Removes the other compression variant so the directory holds exactly
    /// one entry for the date.
    pub fn write_bytes(
        &self,
        date: NaiveDate,
        bytes: &[u8],
        compressed: bool,
    ) -> ArchiveResult<PathBuf> {
        ensure_dir(&self.dir)?;

        let path = self.path_for(date, compressed);
        write_bytes_atomic(&path, bytes)?;

        let stale = self.path_for(date, !compressed);
        if stale.exists() {
            fs::remove_file(&stale).map_err(|e| {
                ArchiveError::Io(format!(
                    "Failed to remove stale entry {}: {}",
                    stale.display(),
                    e
                ))
            })?;
        }

        debug!(location = %self.location, path = %path.display(), bytes = bytes.len(), "wrote entry");
        Ok(path)
    }

    /// Find the stored entry for a date, compressed variant first
    pub fn locate(&self, date: NaiveDate) -> Option<ArchiveEntry> {
        [true, false].into_iter().find_map(|compressed| {
            let path = self.path_for(date, compressed);
            let metadata = fs::metadata(&path).ok()?;
            metadata.is_file().then(|| ArchiveEntry {
                date,
                path,
                compressed,
                size_bytes: metadata.len(),
            })
        })
    }

    /// Pure existence check, no validation
    pub fn exists(&self, date: NaiveDate) -> bool {
        self.locate(date).is_some()
    }

    /// Read and parse the snapshot stored for `date`
    pub fn read(&self, date: NaiveDate) -> ArchiveResult<Snapshot> {
        let entry = self
            .locate(date)
            .ok_or_else(|| self.not_found(date))?;
        self.read_entry(&entry)
    }

    /// Read the raw stored blob for `date`
    pub fn read_raw(&self, date: NaiveDate) -> ArchiveResult<(ArchiveEntry, Vec<u8>)> {
        let entry = self
            .locate(date)
            .ok_or_else(|| self.not_found(date))?;
        let bytes = read_bytes(&entry.path)?;
        Ok((entry, bytes))
    }

    /// Read and parse a specific entry
    pub fn read_entry(&self, entry: &ArchiveEntry) -> ArchiveResult<Snapshot> {
        let bytes = read_bytes(&entry.path)?;
        decode(&entry.path, &bytes, entry.compressed)
    }

    /// Read, parse and validate a specific entry
    ///
    /// Schema failures on stored data are corruption, not caller error.
    pub fn read_valid(&self, entry: &ArchiveEntry) -> ArchiveResult<Snapshot> {
        let snapshot = self.read_entry(entry)?;
        snapshot
            .validate()
            .map_err(|e| ArchiveError::corruption(&entry.path, e.to_string()))?;
        Ok(snapshot)
    }

    /// List all entries, sorted by date then variant
    ///
    /// A missing directory is an empty archive. Names that don't follow the
    /// archive naming are skipped.
    pub fn list(&self) -> ArchiveResult<Vec<ArchiveEntry>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();

        for item in fs::read_dir(&self.dir).map_err(|e| {
            ArchiveError::Io(format!(
                "Failed to read {} directory {}: {}",
                self.location,
                self.dir.display(),
                e
            ))
        })? {
            let item = item
                .map_err(|e| ArchiveError::Io(format!("Failed to read directory entry: {}", e)))?;

            let path = item.path();
            let size = match item.metadata() {
                Ok(m) if m.is_file() => m.len(),
                _ => continue,
            };

            if let Some(entry) = ArchiveEntry::from_path(&path, size) {
                entries.push(entry);
            }
        }

        entries.sort_by(|a, b| a.date.cmp(&b.date).then(a.compressed.cmp(&b.compressed)));
        Ok(entries)
    }

    /// List one entry per date, picking the variant `locate` would read
    pub fn list_by_date(&self) -> ArchiveResult<Vec<ArchiveEntry>> {
        Ok(one_per_date(&self.list()?))
    }

    /// Remove an entry's file
    pub fn delete(&self, entry: &ArchiveEntry) -> ArchiveResult<()> {
        fs::remove_file(&entry.path).map_err(|e| {
            ArchiveError::Io(format!("Failed to delete {}: {}", entry.path.display(), e))
        })
    }

    fn not_found(&self, date: NaiveDate) -> ArchiveError {
        let key = date.format("%Y-%m-%d").to_string();
        match self.location {
            Location::Primary => ArchiveError::snapshot_not_found(key),
            Location::Backup => ArchiveError::backup_not_found(key),
        }
    }
}

/// Reduce a sorted listing to one entry per date, compressed variant first
pub fn one_per_date(entries: &[ArchiveEntry]) -> Vec<ArchiveEntry> {
    let mut current: Vec<ArchiveEntry> = Vec::with_capacity(entries.len());

    for entry in entries {
        match current.last_mut() {
            Some(last) if last.date == entry.date => {
                if entry.compressed {
                    *last = entry.clone();
                }
            }
            _ => current.push(entry.clone()),
        }
    }

    current
}

/// Decompress (if needed) and parse a stored blob
pub fn decode(path: &Path, bytes: &[u8], compressed: bool) -> ArchiveResult<Snapshot> {
    let json = if compressed {
        gzip_decode(bytes)
            .map_err(|e| ArchiveError::corruption(path, format!("decompression failed: {}", e)))?
    } else {
        bytes.to_vec()
    };

    serde_json::from_slice(&json)
        .map_err(|e| ArchiveError::corruption(path, format!("parse failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::snapshot::fixtures::snapshot;
    use tempfile::TempDir;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn create_store() -> (SnapshotStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp_dir.path().join("60s"), Location::Primary);
        (store, temp_dir)
    }

    #[test]
    fn test_round_trip_uncompressed() {
        let (store, _temp) = create_store();
        let snap = snapshot("2025-03-04", &["first", "second"]);

        let path = store.write(day("2025-03-04"), &snap, false).unwrap();
        assert!(path.ends_with("2025-03-04.json"));
        assert_eq!(store.read(day("2025-03-04")).unwrap(), snap);
    }

    #[test]
    fn test_round_trip_compressed() {
        let (store, _temp) = create_store();
        let snap = snapshot("2025-03-04", &["first", "second"]);

        let path = store.write(day("2025-03-04"), &snap, true).unwrap();
        assert!(path.ends_with("2025-03-04.json.gz"));
        assert_eq!(store.read(day("2025-03-04")).unwrap(), snap);
    }

    #[test]
    fn test_write_rejects_invalid_payload() {
        let (store, _temp) = create_store();
        let snap = snapshot("2025-03-04", &[]);

        let err = store.write(day("2025-03-04"), &snap, false).unwrap_err();
        assert!(err.is_validation());
        assert!(!store.exists(day("2025-03-04")));
    }

    #[test]
    fn test_write_creates_directory() {
        let (store, _temp) = create_store();
        assert!(!store.dir().exists());

        store
            .write(day("2025-03-04"), &snapshot("2025-03-04", &["x"]), false)
            .unwrap();
        assert!(store.dir().is_dir());
    }

    #[test]
    fn test_canonical_form_is_pretty_json() {
        let (store, _temp) = create_store();
        let path = store
            .write(day("2025-03-04"), &snapshot("2025-03-04", &["x"]), false)
            .unwrap();

        let text = fs::read_to_string(path).unwrap();
        assert!(text.starts_with("{\n  \"date\""));
    }

    #[test]
    fn test_switching_compression_replaces_variant() {
        let (store, _temp) = create_store();
        let snap = snapshot("2025-03-04", &["x"]);

        store.write(day("2025-03-04"), &snap, false).unwrap();
        store.write(day("2025-03-04"), &snap, true).unwrap();

        let entries = store.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].compressed);
    }

    #[test]
    fn test_read_garbage_is_corruption() {
        let (store, _temp) = create_store();
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.dir().join("2025-03-04.json.gz"), b"\x1f\x8b trunc").unwrap();
        fs::write(store.dir().join("2025-03-05.json"), b"{\"date\":").unwrap();

        assert!(store.read(day("2025-03-04")).unwrap_err().is_corruption());
        assert!(store.read(day("2025-03-05")).unwrap_err().is_corruption());
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let (store, _temp) = create_store();
        assert!(store.read(day("2025-03-04")).unwrap_err().is_not_found());
    }

    #[test]
    fn test_read_valid_flags_schema_failures() {
        let (store, _temp) = create_store();
        let mut snap = snapshot("2025-03-04", &["x"]);
        snap.news.clear();

        fs::create_dir_all(store.dir()).unwrap();
        fs::write(
            store.dir().join("2025-03-04.json"),
            serde_json::to_vec(&snap).unwrap(),
        )
        .unwrap();

        let entry = store.locate(day("2025-03-04")).unwrap();
        assert!(store.read_entry(&entry).is_ok());
        assert!(store.read_valid(&entry).unwrap_err().is_corruption());
    }

    #[test]
    fn test_list_skips_foreign_files() {
        let (store, _temp) = create_store();
        store
            .write(day("2025-03-02"), &snapshot("2025-03-02", &["x"]), true)
            .unwrap();
        store
            .write(day("2025-03-01"), &snapshot("2025-03-01", &["x"]), false)
            .unwrap();
        fs::write(store.dir().join("README.txt"), b"hi").unwrap();
        fs::write(store.dir().join("bad-date.json"), b"{}").unwrap();

        let entries = store.list().unwrap();
        let dates: Vec<_> = entries.iter().map(|e| e.date_key()).collect();
        assert_eq!(dates, vec!["2025-03-01", "2025-03-02"]);
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        let (store, _temp) = create_store();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_by_date_prefers_compressed() {
        let (store, _temp) = create_store();
        store
            .write(day("2025-03-01"), &snapshot("2025-03-01", &["fresh"]), true)
            .unwrap();
        fs::write(store.dir().join("2025-03-01.json"), b"{").unwrap();
        store
            .write(day("2025-03-02"), &snapshot("2025-03-02", &["b"]), false)
            .unwrap();

        assert_eq!(store.list().unwrap().len(), 3);

        let current = store.list_by_date().unwrap();
        assert_eq!(current.len(), 2);
        assert!(current[0].compressed);
        assert_eq!(current[0], store.locate(day("2025-03-01")).unwrap());
        assert!(!current[1].compressed);
    }
}
