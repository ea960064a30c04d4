//! Snapshot sources
//!
//! The archive never fetches anything itself. Whoever drives ingestion hands
//! it a `SnapshotSource`; tests use an in-memory one.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{ArchiveError, ArchiveResult};
use crate::models::Snapshot;

/// Something that can produce the current day's snapshot
pub trait SnapshotSource {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Produce the latest snapshot
    fn fetch(&self) -> ArchiveResult<Snapshot>;
}

/// Upstream API response envelope
#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<Snapshot>,
}

/// Parse either a bare snapshot or the `{code, message, data}` envelope
pub fn parse_payload(bytes: &[u8]) -> ArchiveResult<Snapshot> {
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| ArchiveError::Source(format!("Payload is not JSON: {}", e)))?;

    if value.get("code").is_some() && value.get("news").is_none() {
        let envelope: Envelope = serde_json::from_value(value)
            .map_err(|e| ArchiveError::Source(format!("Malformed response: {}", e)))?;

        if envelope.code != 200 {
            return Err(ArchiveError::Source(format!(
                "Upstream returned {}: {}",
                envelope.code, envelope.message
            )));
        }

        return envelope
            .data
            .ok_or_else(|| ArchiveError::Source("Response has no data".into()));
    }

    serde_json::from_value(value)
        .map_err(|e| ArchiveError::Source(format!("Malformed snapshot: {}", e)))
}

/// Reads a payload saved to disk by an external fetcher
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    /// Create a source reading from `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("file:{}", path.display());
        Self { path, name }
    }
}

impl SnapshotSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> ArchiveResult<Snapshot> {
        let bytes = std::fs::read(&self.path).map_err(|e| {
            ArchiveError::Source(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        parse_payload(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::snapshot::fixtures::snapshot;
    use tempfile::TempDir;

    #[test]
    fn test_bare_payload() {
        let snap = snapshot("2025-03-04", &["a"]);
        let bytes = serde_json::to_vec(&snap).unwrap();
        assert_eq!(parse_payload(&bytes).unwrap(), snap);
    }

    #[test]
    fn test_envelope_payload() {
        let snap = snapshot("2025-03-04", &["a"]);
        let body = serde_json::json!({"code": 200, "message": "success", "data": snap});
        let bytes = serde_json::to_vec(&body).unwrap();
        assert_eq!(parse_payload(&bytes).unwrap(), snap);
    }

    #[test]
    fn test_envelope_error_code() {
        let body = br#"{"code": 500, "message": "upstream down", "data": null}"#;
        let err = parse_payload(body).unwrap_err();
        assert!(err.to_string().contains("upstream down"));
    }

    #[test]
    fn test_file_source() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("payload.json");
        let snap = snapshot("2025-03-04", &["a"]);
        std::fs::write(&path, serde_json::to_vec(&snap).unwrap()).unwrap();

        let source = FileSource::new(&path);
        assert_eq!(source.fetch().unwrap(), snap);
        assert!(source.name().starts_with("file:"));
    }

    #[test]
    fn test_missing_file_is_source_error() {
        let source = FileSource::new("/definitely/not/here.json");
        assert!(matches!(source.fetch(), Err(ArchiveError::Source(_))));
    }
}
