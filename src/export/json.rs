//! JSON Export functionality
//!
//! Exports the selected snapshots as a pretty-printed array of full records.

use std::io::Write;

use crate::error::{ArchiveError, ArchiveResult};
use crate::models::Snapshot;

/// Export snapshots as a JSON array
pub fn export_json<W: Write>(snapshots: &[Snapshot], writer: &mut W) -> ArchiveResult<()> {
    serde_json::to_writer_pretty(&mut *writer, snapshots)
        .map_err(|e| ArchiveError::Export(e.to_string()))?;
    writeln!(writer).map_err(|e| ArchiveError::Export(e.to_string()))?;
    Ok(())
}
