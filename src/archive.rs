//! Archive facade
//!
//! Ties paths, settings and the components together so callers deal with one
//! handle instead of wiring stores themselves.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use crate::backup::{BackupSynchronizer, RetentionManager, SyncedWrite};
use crate::config::{ArchivePaths, Settings};
use crate::error::ArchiveResult;
use crate::export::{
    ArchiveStats, ExportFormat, ExportOutcome, QueryExporter, QueryOptions, QueryOutcome,
};
use crate::ingest::{archive_date, Clock, CursorStore, PollOutcome, Poller, SnapshotSource};
use crate::integrity::{AutoRepairer, IntegrityChecker};
use crate::models::{CleanupReport, CompareMode, IntegrityReport, RepairReport, Snapshot};
use crate::storage::file_io::ensure_dir;

/// A configured snapshot archive
#[derive(Debug, Clone)]
pub struct Archive {
    paths: ArchivePaths,
    settings: Settings,
    sync: BackupSynchronizer,
    exports_dir: PathBuf,
}

impl Archive {
    /// Open an archive with explicit paths and settings
    pub fn open(paths: ArchivePaths, settings: Settings) -> ArchiveResult<Self> {
        settings.validate(&paths)?;

        let sync = BackupSynchronizer::new(
            settings.archive.primary_dir(&paths),
            settings.archive.backup_dir(&paths),
        );
        let exports_dir = settings.archive.exports_dir(&paths);

        Ok(Self {
            paths,
            settings,
            sync,
            exports_dir,
        })
    }

    /// Open the archive under `paths`, loading settings from its config file
    pub fn load(paths: ArchivePaths) -> ArchiveResult<Self> {
        let settings = Settings::load_or_create(&paths)?;
        Self::open(paths, settings)
    }

    pub fn paths(&self) -> &ArchivePaths {
        &self.paths
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn synchronizer(&self) -> &BackupSynchronizer {
        &self.sync
    }

    pub fn exports_dir(&self) -> &PathBuf {
        &self.exports_dir
    }

    /// Create the storage directories and persist settings
    pub fn init(&self) -> ArchiveResult<()> {
        ensure_dir(self.sync.primary().dir())?;
        ensure_dir(self.sync.backup().dir())?;
        ensure_dir(&self.exports_dir)?;
        self.settings.save(&self.paths)?;

        info!(base = %self.paths.base_dir().display(), "archive initialized");
        Ok(())
    }

    /// Store a snapshot in both locations
    ///
    /// Without an explicit date the snapshot is filed under the day of its
    /// `date` field.
    pub fn write(
        &self,
        snapshot: &Snapshot,
        date: Option<NaiveDate>,
    ) -> ArchiveResult<SyncedWrite> {
        let date = match date {
            Some(d) => d,
            None => archive_date(snapshot)?,
        };
        self.sync
            .write_with_backup(date, snapshot, self.settings.archive.compression_enabled)
    }

    /// Read the primary snapshot for a date
    pub fn read(&self, date: NaiveDate) -> ArchiveResult<Snapshot> {
        self.sync.primary().read(date)
    }

    /// Overwrite the primary entry for a date with its backup
    pub fn restore(&self, date: NaiveDate) -> ArchiveResult<PathBuf> {
        self.sync.restore(date)
    }

    fn mode(&self, mode: Option<CompareMode>) -> CompareMode {
        mode.unwrap_or(self.settings.archive.comparison_mode)
    }

    /// Full integrity check; `None` uses the configured comparison mode
    pub fn check_integrity(&self, mode: Option<CompareMode>) -> ArchiveResult<IntegrityReport> {
        IntegrityChecker::new(&self.sync).check_integrity(self.mode(mode))
    }

    /// Check and repair; `None` uses the configured comparison mode
    pub fn repair(&self, mode: Option<CompareMode>) -> ArchiveResult<RepairReport> {
        AutoRepairer::new(&self.sync).repair(self.mode(mode))
    }

    /// Apply the retention window as of `now`
    ///
    /// `retention_days` overrides the configured window for this run.
    pub fn cleanup(
        &self,
        now: DateTime<Utc>,
        retention_days: Option<u32>,
    ) -> ArchiveResult<CleanupReport> {
        let days = retention_days.unwrap_or(self.settings.archive.retention_days);
        RetentionManager::new(&self.sync).cleanup(now, days)
    }

    fn exporter(&self) -> QueryExporter<'_> {
        QueryExporter::new(&self.sync, &self.exports_dir)
    }

    pub fn query(&self, options: &QueryOptions) -> ArchiveResult<QueryOutcome> {
        self.exporter().query(options)
    }

    pub fn export(
        &self,
        format: ExportFormat,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> ArchiveResult<ExportOutcome> {
        self.exporter().export(format, start_date, end_date)
    }

    pub fn stats(&self) -> ArchiveResult<ArchiveStats> {
        self.exporter().stats()
    }

    /// Store for the persisted poll cursor
    pub fn cursor_store(&self) -> CursorStore {
        CursorStore::new(self.paths.cursor_file())
    }

    /// One poll attempt against `source`, persisting the cursor on advance
    pub fn poll<S, C>(&self, source: &S, clock: C) -> ArchiveResult<PollOutcome>
    where
        S: SnapshotSource + ?Sized,
        C: Clock,
    {
        Poller::new(
            source,
            &self.sync,
            clock,
            self.settings.archive.compression_enabled,
        )
        .poll_once(&self.cursor_store())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArchiveError;
    use crate::ingest::FixedClock;
    use crate::models::snapshot::fixtures::snapshot;
    use crate::models::IntegrityStatus;
    use std::fs;
    use tempfile::TempDir;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn create_archive() -> (Archive, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = ArchivePaths::with_base_dir(temp_dir.path().to_path_buf());
        let archive = Archive::open(paths, Settings::default()).unwrap();
        archive.init().unwrap();
        (archive, temp_dir)
    }

    struct StaticSource(Snapshot);

    impl SnapshotSource for StaticSource {
        fn name(&self) -> &str {
            "static"
        }

        fn fetch(&self) -> ArchiveResult<Snapshot> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_init_creates_layout() {
        let (archive, temp) = create_archive();
        assert!(temp.path().join("data").join("60s").is_dir());
        assert!(temp.path().join("data").join("60s-backup").is_dir());
        assert!(temp.path().join("exports").is_dir());
        assert!(archive.paths().settings_file().exists());
    }

    #[test]
    fn test_write_derives_date() {
        let (archive, _temp) = create_archive();
        let snap = snapshot("2025-03-04", &["a", "b"]);

        let written = archive.write(&snap, None).unwrap();
        assert!(written.primary.ends_with("2025-03-04.json.gz"));
        assert_eq!(archive.read(day("2025-03-04")).unwrap(), snap);
    }

    #[test]
    fn test_write_explicit_date() {
        let (archive, _temp) = create_archive();
        let snap = snapshot("2025-03-04", &["a"]);

        archive.write(&snap, Some(day("2025-03-05"))).unwrap();
        assert!(archive.synchronizer().primary().exists(day("2025-03-05")));
        assert!(!archive.synchronizer().primary().exists(day("2025-03-04")));
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let (archive, _temp) = create_archive();
        let err = archive.read(day("2025-01-01")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_uncompressed_settings() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ArchivePaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut settings = Settings::default();
        settings.archive.compression_enabled = false;
        let archive = Archive::open(paths, settings).unwrap();

        let written = archive.write(&snapshot("2025-03-04", &["a"]), None).unwrap();
        assert!(written.backup.ends_with("2025-03-04.json"));
    }

    #[test]
    fn test_check_and_repair_roundtrip() {
        let (archive, _temp) = create_archive();
        archive.write(&snapshot("2025-03-04", &["a"]), None).unwrap();
        archive.write(&snapshot("2025-03-05", &["b"]), None).unwrap();

        let entry = archive.synchronizer().primary().locate(day("2025-03-05")).unwrap();
        fs::write(&entry.path, b"garbage").unwrap();

        let report = archive.check_integrity(None).unwrap();
        assert_eq!(report.status, IntegrityStatus::Error);

        let repaired = archive.repair(None).unwrap();
        assert_eq!(repaired.restored_from_backup, vec!["2025-03-05.json.gz"]);
        assert!(archive.check_integrity(None).unwrap().is_ok());
    }

    #[test]
    fn test_cleanup_uses_configured_window() {
        let (archive, _temp) = create_archive();
        archive.write(&snapshot("2025-01-01", &["old"]), None).unwrap();
        archive.write(&snapshot("2025-03-01", &["new"]), None).unwrap();

        let now = DateTime::parse_from_rfc3339("2025-03-10T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let report = archive.cleanup(now, None).unwrap();
        assert_eq!(report.deleted.len(), 2);

        let report = archive.cleanup(now, Some(5)).unwrap();
        assert_eq!(report.deleted.len(), 2);
        assert_eq!(archive.stats().unwrap().total_files, 0);
    }

    #[test]
    fn test_poll_persists_cursor() {
        let (archive, _temp) = create_archive();
        let source = StaticSource(snapshot("2025-03-04", &["a"]));
        let clock = FixedClock(Utc::now());

        assert!(archive.poll(&source, clock).unwrap().archived());
        assert!(!archive.poll(&source, clock).unwrap().archived());
        assert_eq!(
            archive.cursor_store().load().unwrap().last_date.as_deref(),
            Some("2025-03-04")
        );
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ArchivePaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut settings = Settings::default();
        settings.archive.retention_days = 0;
        assert!(matches!(
            Archive::open(paths, settings),
            Err(ArchiveError::Config(_))
        ));
    }
}
