//! Custom error types for the snapshot archive
//!
//! This module defines the error hierarchy for the archive using thiserror
//! for ergonomic error definitions.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::Location;

/// The main error type for archive operations
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem failures unrelated to content
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization errors outside of reading stored entries
    #[error("JSON error: {0}")]
    Json(String),

    /// Payload failed schema checks
    #[error("Validation error: {0}")]
    Validation(String),

    /// Stored entry could not be decompressed or parsed
    #[error("Corrupted entry {}: {reason}", path.display())]
    Corruption { path: PathBuf, reason: String },

    /// Expected entry absent
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// One side of a dual write failed
    #[error("{location} write failed: {source}")]
    SideWrite {
        location: Location,
        #[source]
        source: Box<ArchiveError>,
    },

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Snapshot source could not deliver a payload
    #[error("Source error: {0}")]
    Source(String),
}

impl ArchiveError {
    /// Create a "not found" error for a snapshot in the primary location
    pub fn snapshot_not_found(date: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Snapshot",
            identifier: date.into(),
        }
    }

    /// Create a "not found" error for a backup blob
    pub fn backup_not_found(date: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Backup",
            identifier: date.into(),
        }
    }

    /// Create a corruption error for a file
    pub fn corruption(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Corruption {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a corruption error
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::Corruption { .. })
    }

    /// The side that failed, for dual-write errors
    pub fn failed_location(&self) -> Option<Location> {
        match self {
            Self::SideWrite { location, .. } => Some(*location),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ArchiveError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ArchiveError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for archive operations
pub type ArchiveResult<T> = Result<T, ArchiveError>;
