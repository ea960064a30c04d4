//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the archive components.

pub mod ingest;
pub mod maintenance;
pub mod query;

use chrono::NaiveDate;

use crate::models::parse_date_key;

pub use ingest::{handle_ingest_command, handle_next_run_command, handle_poll_command};
pub use maintenance::{
    handle_check_command, handle_cleanup_command, handle_repair_command, handle_restore_command,
};
pub use query::{
    handle_export_command, handle_query_command, handle_read_command, handle_stats_command,
};

/// Parse a `YYYY-MM-DD` command-line argument
pub fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_date_key(value).ok_or_else(|| format!("'{}' is not a YYYY-MM-DD date", value))
}
