//! Report models for batch operations
//!
//! Batch operations never stop at the first bad entry. Their results carry
//! the successes together with an explicit list of what failed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// How primary and backup copies are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompareMode {
    /// Full parsed structure must be equal
    #[default]
    Strict,
    /// Only the calendar day and the news list must be equal
    Loose,
}

impl fmt::Display for CompareMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Loose => write!(f, "loose"),
        }
    }
}

impl FromStr for CompareMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "loose" => Ok(Self::Loose),
            other => Err(format!("unknown comparison mode '{}'", other)),
        }
    }
}

/// Aggregate archive health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IntegrityStatus {
    #[default]
    Ok,
    Warning,
    Error,
}

impl fmt::Display for IntegrityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Result of an integrity scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    /// Days absent from the continuous range of stored dates
    pub missing_dates: Vec<String>,
    /// Primary files that fail decompression, parsing or validation
    pub corrupted_files: Vec<String>,
    /// Primary files whose backup is absent or divergent
    pub backup_mismatches: Vec<String>,
    /// Number of primary entries scanned
    pub total_checked: usize,
    pub status: IntegrityStatus,
}

impl IntegrityReport {
    /// Derive the aggregate status: corruption beats gaps and mismatches
    pub fn compute_status(&mut self) {
        self.status = if !self.corrupted_files.is_empty() {
            IntegrityStatus::Error
        } else if !self.missing_dates.is_empty() || !self.backup_mismatches.is_empty() {
            IntegrityStatus::Warning
        } else {
            IntegrityStatus::Ok
        };
    }

    /// Check if the archive is fully healthy
    pub fn is_ok(&self) -> bool {
        self.status == IntegrityStatus::Ok
    }
}

/// Result of an auto-repair run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairReport {
    /// Files resynchronized from a valid primary
    pub repaired_files: Vec<String>,
    /// Files that could not be fixed
    pub failed_files: Vec<String>,
    /// Corrupted primaries replaced by their backup
    pub restored_from_backup: Vec<String>,
    pub total_repaired: usize,
}

impl RepairReport {
    /// Get a summary of what was repaired
    pub fn summary(&self) -> String {
        format!(
            "Repaired {} ({} restored from backup, {} resynchronized), {} failed",
            self.total_repaired,
            self.restored_from_backup.len(),
            self.repaired_files.len(),
            self.failed_files.len()
        )
    }
}

/// One entry a batch operation could not process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFailure {
    pub path: PathBuf,
    pub reason: String,
}

impl EntryFailure {
    pub fn new(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result of a retention cleanup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupReport {
    /// Paths removed, primary first then backup
    pub deleted: Vec<PathBuf>,
    /// Entries that were due for deletion but could not be removed
    pub failures: Vec<EntryFailure>,
}
