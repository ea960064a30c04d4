//! File I/O utilities with atomic writes
//!
//! Provides safe file operations that won't leave a half-written file behind,
//! plus the gzip codec used for compressed entries.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::ArchiveError;

/// Create a directory and its parents; a no-op if it already exists
pub fn ensure_dir<P: AsRef<Path>>(dir: P) -> Result<(), ArchiveError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|e| {
        ArchiveError::Io(format!(
            "Failed to create directory {}: {}",
            dir.display(),
            e
        ))
    })
}

/// Write bytes to a file atomically (write to temp, then rename)
///
/// The file is either completely written or not modified at all.
pub fn write_bytes_atomic<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<(), ArchiveError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    // Same directory as the target so the rename stays on one filesystem
    let temp_path = temp_path_for(path);

    let file = File::create(&temp_path).map_err(|e| {
        ArchiveError::Io(format!(
            "Failed to create temp file {}: {}",
            temp_path.display(),
            e
        ))
    })?;

    let mut writer = BufWriter::new(file);
    let written = (|| -> std::io::Result<()> {
        writer.write_all(bytes)?;
        writer.flush()?;
        writer.get_ref().sync_all()
    })();

    if let Err(e) = written {
        drop(writer);
        let _ = fs::remove_file(&temp_path);
        return Err(ArchiveError::Io(format!(
            "Failed to write {}: {}",
            path.display(),
            e
        )));
    }
    drop(writer);

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        ArchiveError::Io(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Read a whole file into memory
pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, ArchiveError> {
    let path = path.as_ref();
    fs::read(path)
        .map_err(|e| ArchiveError::Io(format!("Failed to read {}: {}", path.display(), e)))
}

/// Gzip-compress a buffer
pub fn gzip_encode(bytes: &[u8]) -> Result<Vec<u8>, ArchiveError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(bytes)
        .map_err(|e| ArchiveError::Io(format!("Failed to compress data: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| ArchiveError::Io(format!("Failed to finish compression: {}", e)))
}

/// Gzip-decompress a buffer
///
/// Returns the raw decoder error so callers can classify it.
pub fn gzip_decode(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Read JSON from a file, returning a default value if file doesn't exist
pub fn read_json<T, P>(path: P) -> Result<T, ArchiveError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| ArchiveError::Io(format!("Failed to open {}: {}", path.display(), e)))?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .map_err(|e| ArchiveError::Json(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Serialize a value as pretty JSON and write it atomically
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), ArchiveError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let json = serde_json::to_vec_pretty(data)
        .map_err(|e| ArchiveError::Json(format!("Failed to serialize data: {}", e)))?;
    write_bytes_atomic(path, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct TestData {
        name: String,
        value: i32,
    }

    #[test]
    fn test_read_nonexistent_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent.json");

        let data: TestData = read_json(&path).unwrap();
        assert_eq!(data, TestData::default());
    }

    #[test]
    fn test_write_and_read_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.json");

        let data = TestData {
            name: "cursor".to_string(),
            value: 42,
        };

        write_json_atomic(&path, &data).unwrap();
        let loaded: TestData = read_json(&path).unwrap();
        assert_eq!(data, loaded);
    }

    #[test]
    fn test_atomic_write_no_temp_file_left() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("2025-03-01.json.gz");

        write_bytes_atomic(&path, b"payload").unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join("2025-03-01.json.gz.tmp").exists());
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("x.json");

        write_bytes_atomic(&path, b"{}").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("a").join("b");

        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_gzip_codec() {
        let text = "每天 60 秒读懂世界".repeat(20);
        let packed = gzip_encode(text.as_bytes()).unwrap();
        assert!(packed.len() < text.len());
        assert_eq!(gzip_decode(&packed).unwrap(), text.as_bytes());
    }

    #[test]
    fn test_gzip_decode_rejects_garbage() {
        assert!(gzip_decode(b"definitely not gzip").is_err());
    }
}
