//! YAML Export functionality
//!
//! Exports the selected snapshots to YAML for human-readable archiving.

use std::io::Write;

use chrono::Utc;

use crate::error::{ArchiveError, ArchiveResult};
use crate::models::Snapshot;

/// Export snapshots to YAML
pub fn export_yaml<W: Write>(snapshots: &[Snapshot], writer: &mut W) -> ArchiveResult<()> {
    writeln!(writer, "# 60s news archive export")
        .map_err(|e| ArchiveError::Export(e.to_string()))?;
    writeln!(writer, "# Generated: {}", Utc::now().to_rfc3339())
        .map_err(|e| ArchiveError::Export(e.to_string()))?;
    writeln!(writer, "# Days: {}", snapshots.len())
        .map_err(|e| ArchiveError::Export(e.to_string()))?;

    serde_yaml::to_writer(writer, snapshots).map_err(|e| ArchiveError::Export(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::snapshot::fixtures::snapshot;

    #[test]
    fn test_yaml_export_reads_back() {
        let snaps = vec![
            snapshot("2025-03-01", &["a: colon", "b"]),
            snapshot("2025-03-02", &["c"]),
        ];

        let mut output = Vec::new();
        export_yaml(&snaps, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();

        assert!(text.starts_with("# 60s news archive export"));
        let parsed: Vec<Snapshot> = serde_yaml::from_str(&text).unwrap();
        assert_eq!(parsed, snaps);
    }
}
