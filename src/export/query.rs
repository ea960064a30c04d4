//! Query, export and statistics over stored entries
//!
//! Every operation here is a batch: an entry that fails to read is recorded
//! and the rest are still processed.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::backup::BackupSynchronizer;
use crate::error::{ArchiveError, ArchiveResult};
use crate::models::{ArchiveEntry, EntryFailure, Snapshot};
use crate::storage::file_io::ensure_dir;

use super::{csv, json, markdown, yaml, ExportFormat};

/// Filters for a query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Inclusive lower bound
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound
    pub end_date: Option<NaiveDate>,
    /// Case-insensitive substring matched against news items
    pub keyword: Option<String>,
}

impl QueryOptions {
    /// Only a date range
    pub fn range(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Self {
        Self {
            start_date,
            end_date,
            keyword: None,
        }
    }

    /// Only a keyword
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            ..Default::default()
        }
    }

    fn in_range(&self, date: NaiveDate) -> bool {
        self.start_date.map_or(true, |start| date >= start)
            && self.end_date.map_or(true, |end| date <= end)
    }
}

/// One query hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryRecord {
    /// A whole snapshot, when no keyword was given
    Full(Snapshot),
    /// News items of one date that matched a keyword
    Matched { date: String, news: Vec<String> },
}

impl QueryRecord {
    /// News items carried by the record
    pub fn news(&self) -> &[String] {
        match self {
            Self::Matched { news, .. } => news,
            Self::Full(snapshot) => &snapshot.news,
        }
    }
}

/// Query results plus entries that could not be read
#[derive(Debug, Clone, Default)]
pub struct QueryOutcome {
    pub records: Vec<QueryRecord>,
    pub failures: Vec<EntryFailure>,
}

/// Result of an export
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    /// Freshly created export file
    pub path: PathBuf,
    /// Number of dates written
    pub records: usize,
    pub failures: Vec<EntryFailure>,
}

/// Backup synchronization counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupStatus {
    /// Primary entry count
    pub total: usize,
    /// Backup entry count
    pub synchronized: usize,
    /// Primary count minus backup count
    pub need_sync: i64,
}

/// Aggregate archive statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveStats {
    pub total_files: usize,
    pub total_size: u64,
    pub oldest_date: Option<String>,
    pub newest_date: Option<String>,
    pub news_count: usize,
    pub average_news_per_day: f64,
    /// Compressed bytes over compact JSON bytes, across compressed entries
    pub compression_ratio: f64,
    pub backup_status: BackupStatus,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub failures: Vec<EntryFailure>,
}

/// Filters, renders and summarizes archive entries
pub struct QueryExporter<'a> {
    sync: &'a BackupSynchronizer,
    exports_dir: PathBuf,
}

impl<'a> QueryExporter<'a> {
    /// Create a new query exporter writing exports under `exports_dir`
    pub fn new(sync: &'a BackupSynchronizer, exports_dir: impl Into<PathBuf>) -> Self {
        Self {
            sync,
            exports_dir: exports_dir.into(),
        }
    }

    /// Directory exports are written to
    pub fn exports_dir(&self) -> &Path {
        &self.exports_dir
    }

    /// Entries in the date range, one per date, with read failures split out
    fn load(
        &self,
        options: &QueryOptions,
    ) -> ArchiveResult<(Vec<(ArchiveEntry, Snapshot)>, Vec<EntryFailure>)> {
        let store = self.sync.primary();
        let mut loaded = Vec::new();
        let mut failures = Vec::new();

        for entry in store.list_by_date()? {
            if !options.in_range(entry.date) {
                continue;
            }

            match store.read_entry(&entry) {
                Ok(snapshot) => loaded.push((entry, snapshot)),
                Err(e) => {
                    warn!(file = %entry.file_name(), error = %e, "skipping unreadable entry");
                    failures.push(EntryFailure::new(&entry.path, e));
                }
            }
        }

        Ok((loaded, failures))
    }

    /// Entries in range; with a keyword, only the matching news items
    pub fn query(&self, options: &QueryOptions) -> ArchiveResult<QueryOutcome> {
        let (loaded, failures) = self.load(options)?;
        let needle = options.keyword.as_ref().map(|k| k.to_lowercase());

        let records = loaded
            .into_iter()
            .filter_map(|(entry, snapshot)| match &needle {
                None => Some(QueryRecord::Full(snapshot)),
                Some(needle) => {
                    let news: Vec<String> = snapshot
                        .news
                        .into_iter()
                        .filter(|item| item.to_lowercase().contains(needle.as_str()))
                        .collect();
                    (!news.is_empty()).then(|| QueryRecord::Matched {
                        date: entry.date_key(),
                        news,
                    })
                }
            })
            .collect::<Vec<_>>();

        debug!(hits = records.len(), failures = failures.len(), "query complete");
        Ok(QueryOutcome { records, failures })
    }

    /// Render entries in range to a fresh timestamped file
    pub fn export(
        &self,
        format: ExportFormat,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> ArchiveResult<ExportOutcome> {
        self.export_at(format, start_date, end_date, Utc::now())
    }

    /// `export` with an explicit clock reading for the file name
    pub fn export_at(
        &self,
        format: ExportFormat,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> ArchiveResult<ExportOutcome> {
        let (loaded, failures) = self.load(&QueryOptions::range(start_date, end_date))?;
        let snapshots: Vec<Snapshot> = loaded.into_iter().map(|(_, s)| s).collect();

        let mut content = Vec::new();
        match format {
            ExportFormat::Json => json::export_json(&snapshots, &mut content)?,
            ExportFormat::Csv => csv::export_csv(&snapshots, &mut content)?,
            ExportFormat::Markdown => markdown::export_markdown(&snapshots, &mut content)?,
            ExportFormat::Yaml => yaml::export_yaml(&snapshots, &mut content)?,
        }

        ensure_dir(&self.exports_dir)?;
        let path = self.write_fresh(format, now, &content)?;

        info!(path = %path.display(), records = snapshots.len(), %format, "export written");
        Ok(ExportOutcome {
            path,
            records: snapshots.len(),
            failures,
        })
    }

    /// Create a file that did not exist before, suffixing on collision
    fn write_fresh(
        &self,
        format: ExportFormat,
        now: DateTime<Utc>,
        content: &[u8],
    ) -> ArchiveResult<PathBuf> {
        let stamp = now
            .to_rfc3339_opts(SecondsFormat::Millis, true)
            .replace([':', '.'], "-");

        for attempt in 0u32.. {
            let name = if attempt == 0 {
                format!("60s-news-{}.{}", stamp, format.extension())
            } else {
                format!("60s-news-{}-{}.{}", stamp, attempt, format.extension())
            };
            let path = self.exports_dir.join(name);

            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(ArchiveError::Export(format!(
                        "Failed to create {}: {}",
                        path.display(),
                        e
                    )))
                }
            };

            fill_or_remove(&mut file, &path, content)?;
            return Ok(path);
        }

        Err(ArchiveError::Export("No free export file name".into()))
    }

    /// Totals, date span, compression ratio and backup counts
    pub fn stats(&self) -> ArchiveResult<ArchiveStats> {
        let primary = self.sync.primary();
        let entries = primary.list_by_date()?;
        let backup_count = self.sync.backup().list_by_date()?.len();

        let mut stats = ArchiveStats {
            total_files: entries.len(),
            oldest_date: entries.first().map(ArchiveEntry::date_key),
            newest_date: entries.last().map(ArchiveEntry::date_key),
            ..Default::default()
        };

        let mut readable = 0usize;
        let mut compressed_bytes = 0u64;
        let mut uncompressed_bytes = 0u64;

        for entry in &entries {
            stats.total_size += entry.size_bytes;

            let snapshot = match primary.read_entry(entry) {
                Ok(s) => s,
                Err(e) => {
                    warn!(file = %entry.file_name(), error = %e, "skipping unreadable entry");
                    stats.failures.push(EntryFailure::new(&entry.path, e));
                    continue;
                }
            };

            readable += 1;
            stats.news_count += snapshot.news.len();

            if entry.compressed {
                let compact = serde_json::to_vec(&snapshot)?;
                compressed_bytes += entry.size_bytes;
                uncompressed_bytes += compact.len() as u64;
            }
        }

        if readable > 0 {
            stats.average_news_per_day = stats.news_count as f64 / readable as f64;
        }
        if uncompressed_bytes > 0 {
            stats.compression_ratio = compressed_bytes as f64 / uncompressed_bytes as f64;
        }

        stats.backup_status = BackupStatus {
            total: entries.len(),
            synchronized: backup_count,
            need_sync: entries.len() as i64 - backup_count as i64,
        };

        Ok(stats)
    }
}

/// Write the whole export or delete the partial file
fn fill_or_remove<W: Write>(file: &mut W, path: &Path, content: &[u8]) -> ArchiveResult<()> {
    if let Err(e) = file.write_all(content).and_then(|_| file.flush()) {
        if let Err(remove) = std::fs::remove_file(path) {
            warn!(path = %path.display(), error = %remove, "could not remove partial export");
        }
        return Err(ArchiveError::Export(format!(
            "Failed to write {}: {}",
            path.display(),
            e
        )));
    }
    Ok(())
}
