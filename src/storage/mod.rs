//! Storage layer for the snapshot archive
//!
//! Provides per-location snapshot files with atomic writes, optional gzip
//! compression and automatic directory creation.

pub mod file_io;
pub mod snapshot_store;

pub use file_io::{read_json, write_json_atomic};
pub use snapshot_store::SnapshotStore;
