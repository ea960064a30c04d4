//! sixty-archive - local archive for the daily 60-second news digest
//!
//! This library keeps one snapshot of the digest per calendar day. Every entry
//! is mirrored into a backup directory, old entries are pruned by a retention
//! window, and an integrity checker finds gaps, corruption and primary/backup
//! divergence which the repairer then fixes.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path resolution and settings
//! - `error`: Custom error types
//! - `models`: Snapshots, entries and reports
//! - `storage`: Per-location snapshot files
//! - `backup`: Dual writes, restore and retention
//! - `integrity`: Checks and automatic repair
//! - `export`: Query, export and statistics
//! - `ingest`: Snapshot sources, poll schedule and cursor
//! - `archive`: Facade over all of the above
//!
//! # Example
//!
//! ```rust,ignore
//! use sixty_archive::archive::Archive;
//! use sixty_archive::config::ArchivePaths;
//!
//! let archive = Archive::load(ArchivePaths::new()?)?;
//! archive.write(&snapshot, None)?;
//! let report = archive.check_integrity(None)?;
//! ```

pub mod archive;
pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod ingest;
pub mod integrity;
pub mod models;
pub mod storage;

pub use archive::Archive;
pub use error::{ArchiveError, ArchiveResult};
