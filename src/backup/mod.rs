//! Backup system for the snapshot archive
//!
//! Keeps a mirrored copy of every entry and enforces the retention window.
//!
//! # Architecture
//!
//! - `BackupSynchronizer`: writes each snapshot to primary and backup with the
//!   same bytes, and restores primary entries from the backup
//! - `RetentionManager`: deletes entries older than the retention window from
//!   both locations
//!
//! # Layout
//!
//! Both locations use the same file names:
//! - `<YYYY-MM-DD>.json` for plain entries
//! - `<YYYY-MM-DD>.json.gz` for compressed entries
//!
//! # Example
//!
//! ```rust,ignore
//! use sixty_archive::backup::{BackupSynchronizer, RetentionManager};
//!
//! let sync = BackupSynchronizer::new(paths.primary_dir(), paths.backup_dir());
//! sync.write_with_backup(date, &snapshot, true)?;
//!
//! let report = RetentionManager::new(&sync).cleanup(Utc::now(), 30)?;
//! println!("deleted {} file(s)", report.deleted.len());
//! ```

mod retention;
mod sync;

pub use retention::{age_in_days, RetentionManager};
pub use sync::{BackupSynchronizer, SyncedWrite};
