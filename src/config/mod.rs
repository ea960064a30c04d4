//! Configuration module for the snapshot archive
//!
//! This module provides configuration management including:
//! - Base directory resolution
//! - Settings persistence and load-time validation

pub mod paths;
pub mod settings;

pub use paths::ArchivePaths;
pub use settings::{ArchiveSettings, Settings};
