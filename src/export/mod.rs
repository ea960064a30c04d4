//! Export module for the snapshot archive
//!
//! Queries stored entries and renders them in multiple formats:
//! - JSON: full records, machine-readable
//! - CSV: one row per date (spreadsheet-compatible)
//! - Markdown: a readable digest
//! - YAML: full records, human-readable

pub mod csv;
pub mod json;
pub mod markdown;
pub mod query;
pub mod yaml;

use std::fmt;
use std::str::FromStr;

pub use query::{
    ArchiveStats, BackupStatus, ExportOutcome, QueryExporter, QueryOptions, QueryOutcome,
    QueryRecord,
};

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Markdown,
    Yaml,
}

impl ExportFormat {
    /// File extension for the format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Markdown => "md",
            Self::Yaml => "yaml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
            Self::Markdown => write!(f, "markdown"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "markdown" | "md" => Ok(Self::Markdown),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!("unknown export format '{}'", other)),
        }
    }
}
