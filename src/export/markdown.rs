//! Markdown Export functionality
//!
//! A digest document with one section per date and the news as bullets.

use std::io::Write;

use crate::error::{ArchiveError, ArchiveResult};
use crate::models::Snapshot;

/// Title line of the digest
pub const DIGEST_TITLE: &str = "# 60s Daily News Digest";

/// Export snapshots to a Markdown digest
pub fn export_markdown<W: Write>(snapshots: &[Snapshot], writer: &mut W) -> ArchiveResult<()> {
    let io = |e: std::io::Error| ArchiveError::Export(e.to_string());

    writeln!(writer, "{}", DIGEST_TITLE).map_err(io)?;
    writeln!(writer).map_err(io)?;

    for snapshot in snapshots {
        writeln!(writer, "## {}", snapshot.day_key()).map_err(io)?;
        writeln!(writer).map_err(io)?;
        for item in &snapshot.news {
            writeln!(writer, "- {}", item).map_err(io)?;
        }
        writeln!(writer).map_err(io)?;
    }

    Ok(())
}
