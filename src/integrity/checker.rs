//! Archive integrity scanning
//!
//! Looks for gaps in the date range, entries that no longer decode, and
//! primary entries whose backup is absent or has drifted.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::backup::BackupSynchronizer;
use crate::error::ArchiveResult;
use crate::models::{ArchiveEntry, CompareMode, IntegrityReport, Snapshot};
use crate::storage::snapshot_store::one_per_date;

/// Scans primary and backup for problems
pub struct IntegrityChecker<'a> {
    sync: &'a BackupSynchronizer,
}

impl<'a> IntegrityChecker<'a> {
    /// Create a new integrity checker
    pub fn new(sync: &'a BackupSynchronizer) -> Self {
        Self { sync }
    }

    /// Every calendar day between the earliest and latest primary entry that
    /// has no entry
    pub fn check_continuity(&self) -> ArchiveResult<Vec<String>> {
        Ok(missing_dates(&self.sync.primary().list()?))
    }

    /// Primary files that fail decompression, parsing or schema validation
    pub fn check_corruption(&self) -> ArchiveResult<Vec<String>> {
        Ok(self.corrupted_files(&self.sync.primary().list()?))
    }

    /// Primary files whose backup is absent, unreadable or divergent
    ///
    /// Unreadable primaries are skipped here; `check_corruption` owns them.
    pub fn check_backup_consistency(&self, mode: CompareMode) -> ArchiveResult<Vec<String>> {
        Ok(self.backup_mismatches(&self.sync.primary().list()?, mode))
    }

    /// Run every check over a single listing and aggregate a status
    pub fn check_integrity(&self, mode: CompareMode) -> ArchiveResult<IntegrityReport> {
        let entries = self.sync.primary().list()?;

        let mut report = IntegrityReport {
            total_checked: entries.len(),
            missing_dates: missing_dates(&entries),
            corrupted_files: self.corrupted_files(&entries),
            backup_mismatches: self.backup_mismatches(&entries, mode),
            ..Default::default()
        };
        report.compute_status();

        info!(
            status = %report.status,
            checked = report.total_checked,
            missing = report.missing_dates.len(),
            corrupted = report.corrupted_files.len(),
            mismatched = report.backup_mismatches.len(),
            "integrity check complete"
        );
        Ok(report)
    }

    fn corrupted_files(&self, entries: &[ArchiveEntry]) -> Vec<String> {
        let store = self.sync.primary();

        entries
            .iter()
            .filter(|entry| match store.read_valid(entry) {
                Ok(_) => false,
                Err(e) => {
                    warn!(file = %entry.file_name(), error = %e, "corrupted entry");
                    true
                }
            })
            .map(ArchiveEntry::file_name)
            .collect()
    }

    /// Compares the variant of each date that reads would use
    fn backup_mismatches(&self, entries: &[ArchiveEntry], mode: CompareMode) -> Vec<String> {
        let primary = self.sync.primary();
        let backup = self.sync.backup();
        let mut mismatches = Vec::new();

        for entry in one_per_date(entries) {
            let Ok(main) = primary.read_valid(&entry) else {
                continue;
            };

            let consistent = match backup.locate(entry.date) {
                None => {
                    debug!(file = %entry.file_name(), "backup missing");
                    false
                }
                Some(backup_entry) => match backup.read_entry(&backup_entry) {
                    Ok(copy) => snapshots_match(&main, &copy, mode),
                    Err(e) => {
                        debug!(file = %entry.file_name(), error = %e, "backup unreadable");
                        false
                    }
                },
            };

            if !consistent {
                mismatches.push(entry.file_name());
            }
        }

        mismatches
    }
}

fn missing_dates(entries: &[ArchiveEntry]) -> Vec<String> {
    let dates: BTreeSet<NaiveDate> = entries.iter().map(|entry| entry.date).collect();

    let (Some(&first), Some(&last)) = (dates.first(), dates.last()) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|d| *d <= last)
        .filter(|d| !dates.contains(d))
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect()
}

/// Compare two copies of a snapshot under a comparison mode
pub fn snapshots_match(a: &Snapshot, b: &Snapshot, mode: CompareMode) -> bool {
    match mode {
        CompareMode::Strict => a == b,
        CompareMode::Loose => a.same_content(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::snapshot::fixtures::snapshot;
    use crate::models::IntegrityStatus;
    use std::fs;
    use tempfile::TempDir;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn create_archive(dates: &[&str]) -> (BackupSynchronizer, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let sync = BackupSynchronizer::new(
            temp_dir.path().join("60s"),
            temp_dir.path().join("60s-backup"),
        );
        for d in dates {
            sync.write_with_backup(day(d), &snapshot(d, &["a", "b"]), true)
                .unwrap();
        }
        (sync, temp_dir)
    }

    #[test]
    fn test_continuity_reports_gap() {
        let (sync, _temp) = create_archive(&["2025-03-01", "2025-03-03"]);
        let checker = IntegrityChecker::new(&sync);
        assert_eq!(checker.check_continuity().unwrap(), vec!["2025-03-02"]);
    }

    #[test]
    fn test_continuity_spans_month_end() {
        let (sync, _temp) = create_archive(&["2025-02-27", "2025-03-02"]);
        let checker = IntegrityChecker::new(&sync);
        assert_eq!(
            checker.check_continuity().unwrap(),
            vec!["2025-02-28", "2025-03-01"]
        );
    }

    #[test]
    fn test_continuity_with_zero_or_one_entry() {
        let (sync, _temp) = create_archive(&[]);
        assert!(IntegrityChecker::new(&sync).check_continuity().unwrap().is_empty());

        let (sync, _temp) = create_archive(&["2025-03-01"]);
        assert!(IntegrityChecker::new(&sync).check_continuity().unwrap().is_empty());
    }

    #[test]
    fn test_truncated_blob_is_corrupted() {
        let (sync, _temp) = create_archive(&["2025-03-01", "2025-03-02"]);
        let entry = sync.primary().locate(day("2025-03-01")).unwrap();
        let bytes = fs::read(&entry.path).unwrap();
        fs::write(&entry.path, &bytes[..bytes.len() / 2]).unwrap();

        let checker = IntegrityChecker::new(&sync);
        assert_eq!(checker.check_corruption().unwrap(), vec!["2025-03-01.json.gz"]);

        let report = checker.check_integrity(CompareMode::Strict).unwrap();
        assert_eq!(report.status, IntegrityStatus::Error);
        assert_eq!(report.total_checked, 2);
        // Corrupted primaries are not double-reported as mismatches
        assert!(report.backup_mismatches.is_empty());
    }

    #[test]
    fn test_loose_mode_ignores_cover() {
        let (sync, _temp) = create_archive(&[]);
        let main = snapshot("2025-03-01", &["a", "b"]);
        let mut copy = main.clone();
        copy.cover = "https://example.com/different.jpg".into();

        sync.primary().write(day("2025-03-01"), &main, false).unwrap();
        sync.backup().write(day("2025-03-01"), &copy, false).unwrap();

        let checker = IntegrityChecker::new(&sync);
        assert!(checker
            .check_backup_consistency(CompareMode::Loose)
            .unwrap()
            .is_empty());
        assert_eq!(
            checker.check_backup_consistency(CompareMode::Strict).unwrap(),
            vec!["2025-03-01.json"]
        );
    }

    #[test]
    fn test_loose_mode_catches_news_drift() {
        let (sync, _temp) = create_archive(&[]);
        sync.primary()
            .write(day("2025-03-01"), &snapshot("2025-03-01", &["a", "b"]), false)
            .unwrap();
        sync.backup()
            .write(day("2025-03-01"), &snapshot("2025-03-01", &["b", "a"]), false)
            .unwrap();

        let checker = IntegrityChecker::new(&sync);
        assert_eq!(
            checker.check_backup_consistency(CompareMode::Loose).unwrap(),
            vec!["2025-03-01.json"]
        );
    }

    #[test]
    fn test_missing_backup_is_mismatch() {
        let (sync, _temp) = create_archive(&["2025-03-01"]);
        // Simulates a crash between the primary and backup writes
        sync.primary()
            .write(day("2025-03-02"), &snapshot("2025-03-02", &["x"]), true)
            .unwrap();

        let report = IntegrityChecker::new(&sync)
            .check_integrity(CompareMode::Strict)
            .unwrap();
        assert_eq!(report.backup_mismatches, vec!["2025-03-02.json.gz"]);
        assert_eq!(report.status, IntegrityStatus::Warning);
    }

    #[test]
    fn test_healthy_archive_is_ok() {
        let (sync, _temp) = create_archive(&["2025-03-01", "2025-03-02", "2025-03-03"]);
        let report = IntegrityChecker::new(&sync)
            .check_integrity(CompareMode::Strict)
            .unwrap();
        assert!(report.is_ok());
        assert_eq!(report.total_checked, 3);
    }

    #[test]
    fn test_loose_mode_with_space_separated_dates() {
        let (sync, _temp) = create_archive(&[]);
        let mut main = snapshot("2025-03-01", &["a"]);
        main.date = "2025-03-01 08:00:00".into();
        let mut copy = main.clone();
        copy.date = "2025-03-01 09:30:00".into();

        sync.primary().write(day("2025-03-01"), &main, false).unwrap();
        sync.backup().write(day("2025-03-01"), &copy, false).unwrap();

        let checker = IntegrityChecker::new(&sync);
        assert!(checker
            .check_backup_consistency(CompareMode::Loose)
            .unwrap()
            .is_empty());
        assert_eq!(
            checker.check_backup_consistency(CompareMode::Strict).unwrap(),
            vec!["2025-03-01.json"]
        );
    }

    #[test]
    fn test_stale_plain_variant_beside_compressed() {
        let (sync, _temp) = create_archive(&["2025-03-01"]);
        fs::write(sync.primary().dir().join("2025-03-01.json"), b"{").unwrap();

        let report = IntegrityChecker::new(&sync)
            .check_integrity(CompareMode::Strict)
            .unwrap();

        assert_eq!(report.total_checked, 2);
        assert_eq!(report.corrupted_files, vec!["2025-03-01.json"]);
        // The compressed copy is the one reads use, and it matches its backup
        assert!(report.backup_mismatches.is_empty());
        assert!(report.missing_dates.is_empty());
    }
}
