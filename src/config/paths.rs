//! Path management for the snapshot archive
//!
//! ## Path Resolution Order
//!
//! 1. `SIXTY_ARCHIVE_DIR` environment variable (if set)
//! 2. The platform data directory from `directories` (e.g.
//!    `~/.local/share/sixty-archive` on Linux)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::ArchiveError;

/// Environment variable overriding the base directory
pub const BASE_DIR_ENV: &str = "SIXTY_ARCHIVE_DIR";

/// Manages all paths used by the archive
#[derive(Debug, Clone)]
pub struct ArchivePaths {
    /// Base directory for all archive data
    base_dir: PathBuf,
}

impl ArchivePaths {
    /// Create a new ArchivePaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined and the
    /// override variable is not set.
    pub fn new() -> Result<Self, ArchiveError> {
        let base_dir = match std::env::var_os(BASE_DIR_ENV) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create ArchivePaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Default primary snapshot directory (`<base>/data/60s`)
    pub fn primary_dir(&self) -> PathBuf {
        self.base_dir.join("data").join("60s")
    }

    /// Default backup snapshot directory (`<base>/data/60s-backup`)
    pub fn backup_dir(&self) -> PathBuf {
        self.base_dir.join("data").join("60s-backup")
    }

    /// Default exports directory (`<base>/exports`)
    pub fn exports_dir(&self) -> PathBuf {
        self.base_dir.join("exports")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the persisted poll cursor
    pub fn cursor_file(&self) -> PathBuf {
        self.base_dir.join("cursor.json")
    }
}

fn resolve_default_path() -> Result<PathBuf, ArchiveError> {
    ProjectDirs::from("", "", "sixty-archive")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            ArchiveError::Config(format!(
                "Could not determine a data directory; set {}",
                BASE_DIR_ENV
            ))
        })
}
