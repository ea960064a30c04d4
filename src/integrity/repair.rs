//! Automatic repair driven by an integrity report

use std::collections::HashSet;
use std::fs;

use tracing::{info, warn};

use crate::backup::BackupSynchronizer;
use crate::error::{ArchiveError, ArchiveResult};
use crate::models::{parse_entry_name, ArchiveEntry, CompareMode, RepairReport};

use super::checker::IntegrityChecker;

/// Fixes corrupted and diverged entries
pub struct AutoRepairer<'a> {
    sync: &'a BackupSynchronizer,
}

impl<'a> AutoRepairer<'a> {
    /// Create a new repairer
    pub fn new(sync: &'a BackupSynchronizer) -> Self {
        Self { sync }
    }

    /// Check the archive once, then repair what it reported
    ///
    /// Corrupted primaries are restored from backup first. Mismatches not
    /// already handled are then resynchronized from a valid primary. Only
    /// files named in the report are touched.
    pub fn repair(&self, mode: CompareMode) -> ArchiveResult<RepairReport> {
        let check = IntegrityChecker::new(self.sync).check_integrity(mode)?;
        let mut report = RepairReport::default();
        let mut handled = HashSet::new();

        for file in &check.corrupted_files {
            handled.insert(file.as_str());

            match self.restore_file(file) {
                Ok(()) => {
                    info!(%file, "restored corrupted entry from backup");
                    report.restored_from_backup.push(file.clone());
                }
                Err(e) => {
                    warn!(%file, error = %e, "could not restore corrupted entry");
                    report.failed_files.push(file.clone());
                }
            }
        }

        for file in &check.backup_mismatches {
            if handled.contains(file.as_str()) {
                continue;
            }

            match self.resync_file(file) {
                Ok(()) => {
                    info!(%file, "resynchronized backup from primary");
                    report.repaired_files.push(file.clone());
                }
                Err(e) => {
                    warn!(%file, error = %e, "could not resynchronize entry");
                    report.failed_files.push(file.clone());
                }
            }
        }

        report.total_repaired = report.restored_from_backup.len() + report.repaired_files.len();
        Ok(report)
    }

    fn restore_file(&self, file: &str) -> ArchiveResult<()> {
        let (date, _) = parse_file(file)?;
        self.sync.restore(date).map(|_| ())
    }

    /// Rewrite both sides from the primary's content, keeping its variant
    fn resync_file(&self, file: &str) -> ArchiveResult<()> {
        let primary = self.sync.primary();
        let path = primary.dir().join(file);

        let metadata = fs::metadata(&path).map_err(|_| ArchiveError::snapshot_not_found(file))?;
        let entry = ArchiveEntry::from_path(&path, metadata.len())
            .ok_or_else(|| ArchiveError::Validation(format!("Not an archive entry: {}", file)))?;

        let snapshot = primary.read_valid(&entry)?;
        self.sync
            .write_with_backup(entry.date, &snapshot, entry.compressed)
            .map(|_| ())
    }
}

fn parse_file(file: &str) -> ArchiveResult<(chrono::NaiveDate, bool)> {
    parse_entry_name(file)
        .ok_or_else(|| ArchiveError::Validation(format!("Not an archive entry: {}", file)))
}
