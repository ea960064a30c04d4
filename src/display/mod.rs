//! Display formatting for terminal output
//!
//! Renders snapshots, query hits and reports as plain text and tables.

pub mod report;
pub mod snapshot;

pub use report::{
    format_cleanup_report, format_failures, format_integrity_report, format_repair_report,
    format_size, format_stats,
};
pub use snapshot::{format_query_records, format_snapshot};
