//! Archive entry model
//!
//! The physical form of a snapshot: one file per date per location.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Plain JSON entry suffix
pub const JSON_SUFFIX: &str = ".json";

/// Gzip-compressed entry suffix
pub const GZIP_SUFFIX: &str = ".json.gz";

/// Date format used in entry file names
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which copy of the archive an entry lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Primary,
    Backup,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Backup => write!(f, "backup"),
        }
    }
}

/// A stored snapshot file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Calendar date the entry is keyed by
    pub date: NaiveDate,

    /// Full path to the file
    pub path: PathBuf,

    /// Whether the blob is gzip-compressed
    pub compressed: bool,

    /// Size on disk in bytes
    pub size_bytes: u64,
}

impl ArchiveEntry {
    /// Build an entry from a path, if the file name follows the archive naming
    pub fn from_path(path: &Path, size_bytes: u64) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let (date, compressed) = parse_entry_name(name)?;
        Some(Self {
            date,
            path: path.to_path_buf(),
            compressed,
            size_bytes,
        })
    }

    /// File name of the entry, e.g. `2025-03-01.json.gz`
    pub fn file_name(&self) -> String {
        entry_file_name(self.date, self.compressed)
    }

    /// The `YYYY-MM-DD` key
    pub fn date_key(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

/// Build the file name for a date
pub fn entry_file_name(date: NaiveDate, compressed: bool) -> String {
    let suffix = if compressed { GZIP_SUFFIX } else { JSON_SUFFIX };
    format!("{}{}", date.format(DATE_FORMAT), suffix)
}

/// Parse `<YYYY-MM-DD>.json` or `<YYYY-MM-DD>.json.gz`
///
/// Returns `None` for anything else, including temp files and stray names.
pub fn parse_entry_name(name: &str) -> Option<(NaiveDate, bool)> {
    let (stem, compressed) = if let Some(stem) = name.strip_suffix(GZIP_SUFFIX) {
        (stem, true)
    } else if let Some(stem) = name.strip_suffix(JSON_SUFFIX) {
        (stem, false)
    } else {
        return None;
    };

    // chrono accepts unpadded fields, the archive does not
    if stem.len() != 10 {
        return None;
    }

    let date = NaiveDate::parse_from_str(stem, DATE_FORMAT).ok()?;
    Some((date, compressed))
}

/// Parse a `YYYY-MM-DD` date argument
pub fn parse_date_key(value: &str) -> Option<NaiveDate> {
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}
