//! Polling a source into the archive
//!
//! A poll attempt fetches the latest snapshot and archives it only when its
//! `updated` stamp is newer than the last one archived. The cursor that
//! remembers that stamp is persisted so restarts don't re-archive.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::schedule::Clock;
use super::source::SnapshotSource;
use crate::backup::{BackupSynchronizer, SyncedWrite};
use crate::error::{ArchiveError, ArchiveResult};
use crate::models::{parse_timestamp, Snapshot};
use crate::storage::{read_json, write_json_atomic};

/// The last successfully archived update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollCursor {
    /// `updated` value of the last archived snapshot
    #[serde(default)]
    pub last_update: Option<String>,

    /// Archive date key of the last archived snapshot
    #[serde(default)]
    pub last_date: Option<String>,

    /// When the cursor last advanced
    #[serde(default)]
    pub advanced_at: Option<DateTime<Utc>>,
}

impl PollCursor {
    /// Whether `snapshot` is newer than what the cursor has seen
    ///
    /// An empty cursor accepts anything. Stamps that fail to parse fall back
    /// to string comparison.
    pub fn is_newer(&self, snapshot: &Snapshot) -> bool {
        let Some(last) = &self.last_update else {
            return true;
        };

        match (parse_timestamp(&snapshot.updated), parse_timestamp(last)) {
            (Some(current), Some(previous)) => current > previous,
            _ => snapshot.updated.as_str() > last.as_str(),
        }
    }
}

/// Reads and writes the cursor file
#[derive(Debug, Clone)]
pub struct CursorStore {
    path: PathBuf,
}

impl CursorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cursor; a missing file is an empty cursor
    pub fn load(&self) -> ArchiveResult<PollCursor> {
        read_json(&self.path)
    }

    pub fn save(&self, cursor: &PollCursor) -> ArchiveResult<()> {
        write_json_atomic(&self.path, cursor)
    }
}

/// What a poll attempt did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult {
    /// New data was archived under this date
    Archived { date: NaiveDate, write: SyncedWrite },
    /// The source had nothing newer than the cursor
    UpToDate,
}

/// Result of a poll attempt together with the cursor to keep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    pub result: PollResult,
    pub cursor: PollCursor,
    pub attempted_at: DateTime<Utc>,
}

impl PollOutcome {
    pub fn archived(&self) -> bool {
        matches!(self.result, PollResult::Archived { .. })
    }
}

/// Fetches from a source and archives new snapshots
pub struct Poller<'a, S: SnapshotSource + ?Sized, C: Clock> {
    source: &'a S,
    sync: &'a BackupSynchronizer,
    clock: C,
    compressed: bool,
}

impl<'a, S: SnapshotSource + ?Sized, C: Clock> Poller<'a, S, C> {
    pub fn new(source: &'a S, sync: &'a BackupSynchronizer, clock: C, compressed: bool) -> Self {
        Self {
            source,
            sync,
            clock,
            compressed,
        }
    }

    /// Run one attempt against `cursor`
    ///
    /// The returned cursor only differs from the input when a snapshot was
    /// archived. On any error the caller keeps its old cursor.
    pub fn attempt_fetch(&self, cursor: &PollCursor) -> ArchiveResult<PollOutcome> {
        let attempted_at = self.clock.now();
        let snapshot = self.source.fetch()?;

        if !cursor.is_newer(&snapshot) {
            debug!(
                source = self.source.name(),
                updated = %snapshot.updated,
                "no new data"
            );
            return Ok(PollOutcome {
                result: PollResult::UpToDate,
                cursor: cursor.clone(),
                attempted_at,
            });
        }

        let date = archive_date(&snapshot)?;
        let write = self
            .sync
            .write_with_backup(date, &snapshot, self.compressed)?;

        info!(
            source = self.source.name(),
            %date,
            updated = %snapshot.updated,
            "archived new snapshot"
        );

        Ok(PollOutcome {
            result: PollResult::Archived { date, write },
            cursor: PollCursor {
                last_update: Some(snapshot.updated.clone()),
                last_date: Some(date.to_string()),
                advanced_at: Some(attempted_at),
            },
            attempted_at,
        })
    }

    /// Load the cursor, attempt, and persist the cursor if it advanced
    pub fn poll_once(&self, store: &CursorStore) -> ArchiveResult<PollOutcome> {
        let cursor = store.load()?;
        let outcome = self.attempt_fetch(&cursor)?;
        if outcome.cursor != cursor {
            store.save(&outcome.cursor)?;
        }
        Ok(outcome)
    }
}

/// Date a snapshot is filed under: the day part of its `date` field
pub fn archive_date(snapshot: &Snapshot) -> ArchiveResult<NaiveDate> {
    snapshot.calendar_day().ok_or_else(|| {
        ArchiveError::Validation(format!("Snapshot date {:?} has no day", snapshot.date))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::schedule::FixedClock;
    use crate::models::snapshot::fixtures::snapshot;
    use std::cell::{Cell, RefCell};
    use tempfile::TempDir;

    struct FakeSource {
        snapshot: RefCell<Snapshot>,
        fail: Cell<bool>,
        calls: Cell<usize>,
    }

    impl FakeSource {
        fn new(snapshot: Snapshot) -> Self {
            Self {
                snapshot: RefCell::new(snapshot),
                fail: Cell::new(false),
                calls: Cell::new(0),
            }
        }
    }

    impl SnapshotSource for FakeSource {
        fn name(&self) -> &str {
            "fake"
        }

        fn fetch(&self) -> ArchiveResult<Snapshot> {
            self.calls.set(self.calls.get() + 1);
            if self.fail.get() {
                return Err(ArchiveError::Source("offline".into()));
            }
            Ok(self.snapshot.borrow().clone())
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-03-04T16:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn create_sync() -> (BackupSynchronizer, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let sync = BackupSynchronizer::new(
            temp_dir.path().join("60s"),
            temp_dir.path().join("60s-backup"),
        );
        (sync, temp_dir)
    }

    #[test]
    fn test_empty_cursor_archives() {
        let (sync, _temp) = create_sync();
        let source = FakeSource::new(snapshot("2025-03-04", &["a"]));
        let poller = Poller::new(&source, &sync, FixedClock(now()), true);

        let outcome = poller.attempt_fetch(&PollCursor::default()).unwrap();
        assert!(outcome.archived());
        assert_eq!(outcome.cursor.last_date.as_deref(), Some("2025-03-04"));
        assert_eq!(outcome.cursor.advanced_at, Some(now()));

        let date = archive_date(&source.snapshot.borrow()).unwrap();
        assert!(sync.primary().exists(date));
        assert!(sync.backup().exists(date));
    }

    #[test]
    fn test_repeat_attempt_is_idempotent() {
        let (sync, _temp) = create_sync();
        let source = FakeSource::new(snapshot("2025-03-04", &["a"]));
        let poller = Poller::new(&source, &sync, FixedClock(now()), false);

        let first = poller.attempt_fetch(&PollCursor::default()).unwrap();
        let second = poller.attempt_fetch(&first.cursor).unwrap();

        assert_eq!(second.result, PollResult::UpToDate);
        assert_eq!(second.cursor, first.cursor);
        assert_eq!(source.calls.get(), 2);
    }

    #[test]
    fn test_newer_update_advances() {
        let (sync, _temp) = create_sync();
        let source = FakeSource::new(snapshot("2025-03-04", &["a"]));
        let poller = Poller::new(&source, &sync, FixedClock(now()), false);

        let first = poller.attempt_fetch(&PollCursor::default()).unwrap();

        let mut next = snapshot("2025-03-05", &["b"]);
        next.updated = "2025-03-05T00:01:00.000Z".into();
        *source.snapshot.borrow_mut() = next;

        let second = poller.attempt_fetch(&first.cursor).unwrap();
        assert!(second.archived());
        assert_eq!(
            second.cursor.last_update.as_deref(),
            Some("2025-03-05T00:01:00.000Z")
        );
    }

    #[test]
    fn test_older_update_is_ignored() {
        let cursor = PollCursor {
            last_update: Some("2025-03-05T00:00:00Z".into()),
            ..Default::default()
        };
        assert!(!cursor.is_newer(&snapshot("2025-03-04", &["a"])));
    }

    #[test]
    fn test_source_failure_leaves_cursor() {
        let (sync, temp) = create_sync();
        let source = FakeSource::new(snapshot("2025-03-04", &["a"]));
        source.fail.set(true);
        let poller = Poller::new(&source, &sync, FixedClock(now()), false);
        let store = CursorStore::new(temp.path().join("cursor.json"));

        assert!(poller.poll_once(&store).is_err());
        assert!(!store.path().exists());
        assert_eq!(sync.primary().list().unwrap().len(), 0);
    }

    #[test]
    fn test_invalid_snapshot_does_not_advance() {
        let (sync, _temp) = create_sync();
        let mut bad = snapshot("2025-03-04", &["a"]);
        bad.news.clear();
        let source = FakeSource::new(bad);
        let poller = Poller::new(&source, &sync, FixedClock(now()), false);

        assert!(poller.attempt_fetch(&PollCursor::default()).is_err());
    }

    #[test]
    fn test_poll_once_persists_cursor() {
        let (sync, temp) = create_sync();
        let source = FakeSource::new(snapshot("2025-03-04", &["a"]));
        let poller = Poller::new(&source, &sync, FixedClock(now()), true);
        let store = CursorStore::new(temp.path().join("cursor.json"));

        let outcome = poller.poll_once(&store).unwrap();
        assert!(outcome.archived());
        assert_eq!(store.load().unwrap(), outcome.cursor);

        let again = poller.poll_once(&store).unwrap();
        assert!(!again.archived());
    }

    #[test]
    fn test_archive_date_uses_local_day() {
        let mut snap = snapshot("2025-03-04", &["a"]);
        snap.date = "2025-03-05T00:30:00+08:00".into();
        assert_eq!(archive_date(&snap).unwrap().to_string(), "2025-03-05");
    }
}
