//! Retention window enforcement
//!
//! Primary and backup are cleaned independently. Within one run a stale date
//! can disappear from one side before the other; both sides converge.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::ArchiveResult;
use crate::models::{ArchiveEntry, CleanupReport, EntryFailure, Location};

use super::sync::BackupSynchronizer;

/// Deletes entries older than the retention window from both locations
pub struct RetentionManager<'a> {
    sync: &'a BackupSynchronizer,
}

impl<'a> RetentionManager<'a> {
    /// Create a new retention manager
    pub fn new(sync: &'a BackupSynchronizer) -> Self {
        Self { sync }
    }

    /// Delete every entry whose age in whole days exceeds `retention_days`
    ///
    /// Failing to list a directory aborts the run; failing to delete a single
    /// file is recorded and the run continues.
    pub fn cleanup(&self, now: DateTime<Utc>, retention_days: u32) -> ArchiveResult<CleanupReport> {
        let mut report = CleanupReport::default();

        for location in [Location::Primary, Location::Backup] {
            let store = self.sync.store(location);
            let entries = store.list()?;
            debug!(%location, count = entries.len(), "scanning for expired entries");

            for entry in entries {
                if !is_expired(&entry, now, retention_days) {
                    continue;
                }

                match store.delete(&entry) {
                    Ok(()) => {
                        info!(%location, path = %entry.path.display(), "deleted expired entry");
                        report.deleted.push(entry.path);
                    }
                    Err(e) => {
                        warn!(%location, path = %entry.path.display(), error = %e, "failed to delete expired entry");
                        report.failures.push(EntryFailure::new(entry.path, e));
                    }
                }
            }
        }

        Ok(report)
    }
}

/// Whole days between the entry's date (midnight UTC) and `now`
pub fn age_in_days(entry: &ArchiveEntry, now: DateTime<Utc>) -> i64 {
    let midnight = entry.date.and_hms_opt(0, 0, 0).map(|t| t.and_utc());
    match midnight {
        Some(start) => (now - start).num_seconds().div_euclid(86_400),
        None => 0,
    }
}

fn is_expired(entry: &ArchiveEntry, now: DateTime<Utc>, retention_days: u32) -> bool {
    age_in_days(entry, now) > i64::from(retention_days)
}
