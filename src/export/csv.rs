//! CSV Export functionality
//!
//! One row per date: the `YYYY-MM-DD` day key and all news items joined
//! with `|`. Markdown sections use the same key.

use std::io::Write;

use crate::error::{ArchiveError, ArchiveResult};
use crate::models::Snapshot;

/// Export snapshots to CSV
pub fn export_csv<W: Write>(snapshots: &[Snapshot], writer: &mut W) -> ArchiveResult<()> {
    writeln!(writer, "Date,News").map_err(|e| ArchiveError::Export(e.to_string()))?;

    for snapshot in snapshots {
        writeln!(
            writer,
            "{},{}",
            escape_csv(&snapshot.day_key()),
            quote_csv(&snapshot.news.join("|"))
        )
        .map_err(|e| ArchiveError::Export(e.to_string()))?;
    }

    Ok(())
}

/// Always quote, doubling embedded quotes
fn quote_csv(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Quote only when needed
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        quote_csv(s)
    } else {
        s.to_string()
    }
}
