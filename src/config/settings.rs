//! User settings for the snapshot archive
//!
//! Every recognized option is listed here with its default. Settings are
//! validated when loaded, so a bad config file fails fast instead of
//! surfacing halfway through a batch.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::ArchivePaths;
use crate::error::ArchiveError;
use crate::ingest::SchedulePolicy;
use crate::models::CompareMode;

/// Archive storage options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveSettings {
    /// Primary snapshot directory (defaults to `<base>/data/60s`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_dir: Option<PathBuf>,

    /// Backup snapshot directory (defaults to `<base>/data/60s-backup`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<PathBuf>,

    /// Export output directory (defaults to `<base>/exports`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exports_dir: Option<PathBuf>,

    /// Entries older than this many whole days are deleted
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Whether new entries are gzip-compressed
    #[serde(default = "default_compression")]
    pub compression_enabled: bool,

    /// How backups are compared during integrity checks
    #[serde(default)]
    pub comparison_mode: CompareMode,
}

fn default_retention_days() -> u32 {
    30
}

fn default_compression() -> bool {
    true
}

fn default_schema_version() -> u32 {
    1
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            primary_dir: None,
            backup_dir: None,
            exports_dir: None,
            retention_days: default_retention_days(),
            compression_enabled: default_compression(),
            comparison_mode: CompareMode::default(),
        }
    }
}

impl ArchiveSettings {
    /// Effective primary directory
    pub fn primary_dir(&self, paths: &ArchivePaths) -> PathBuf {
        self.primary_dir
            .clone()
            .unwrap_or_else(|| paths.primary_dir())
    }

    /// Effective backup directory
    pub fn backup_dir(&self, paths: &ArchivePaths) -> PathBuf {
        self.backup_dir.clone().unwrap_or_else(|| paths.backup_dir())
    }

    /// Effective exports directory
    pub fn exports_dir(&self, paths: &ArchivePaths) -> PathBuf {
        self.exports_dir
            .clone()
            .unwrap_or_else(|| paths.exports_dir())
    }
}

/// User settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Storage options
    #[serde(default)]
    pub archive: ArchiveSettings,

    /// Poll schedule
    #[serde(default)]
    pub schedule: SchedulePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            archive: ArchiveSettings::default(),
            schedule: SchedulePolicy::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or use defaults if the file doesn't exist
    ///
    /// Loaded settings are validated before being returned.
    pub fn load_or_create(paths: &ArchivePaths) -> Result<Self, ArchiveError> {
        let settings_path = paths.settings_file();

        let settings = if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                ArchiveError::Io(format!("Failed to read settings file: {}", e))
            })?;

            serde_json::from_str(&contents).map_err(|e| {
                ArchiveError::Config(format!("Failed to parse settings file: {}", e))
            })?
        } else {
            // Don't save yet - let caller decide when to persist
            Settings::default()
        };

        settings.validate(paths)?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ArchivePaths) -> Result<(), ArchiveError> {
        std::fs::create_dir_all(paths.base_dir())
            .map_err(|e| ArchiveError::Io(format!("Failed to create base directory: {}", e)))?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ArchiveError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| ArchiveError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Check every option against its allowed range
    pub fn validate(&self, paths: &ArchivePaths) -> Result<(), ArchiveError> {
        if self.archive.retention_days == 0 {
            return Err(ArchiveError::Config(
                "archive.retention_days must be at least 1".into(),
            ));
        }

        if self.archive.primary_dir(paths) == self.archive.backup_dir(paths) {
            return Err(ArchiveError::Config(
                "archive.primary_dir and archive.backup_dir must differ".into(),
            ));
        }

        self.schedule.validate()
    }
}
