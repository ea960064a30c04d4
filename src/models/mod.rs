//! Core data models for the snapshot archive
//!
//! This module contains the data structures of the archive domain: the
//! snapshot payload, its on-disk entry form, and the reports produced by
//! batch operations.

pub mod entry;
pub mod report;
pub mod snapshot;

pub use entry::{entry_file_name, parse_date_key, parse_entry_name, ArchiveEntry, Location};
pub use report::{
    CleanupReport, CompareMode, EntryFailure, IntegrityReport, IntegrityStatus, RepairReport,
};
pub use snapshot::{parse_timestamp, Audio, Snapshot, SnapshotValidationError};
