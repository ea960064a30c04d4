//! Snapshot model
//!
//! One day of the "60 seconds to read the world" feed, exactly as the
//! upstream API delivers it.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Audio links attached to a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audio {
    /// Background music URL
    pub music: String,

    /// Narrated news URL
    pub news: String,
}

/// A single dated news document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Publication timestamp
    pub date: String,

    /// Ordered news items
    pub news: Vec<String>,

    /// Audio links
    pub audio: Audio,

    /// Daily tip line
    pub tip: String,

    /// Cover image URL
    pub cover: String,

    /// Source article link
    pub link: String,

    /// Creation timestamp
    pub created: String,

    /// Creation time in epoch milliseconds
    pub created_at: i64,

    /// Last update timestamp
    pub updated: String,

    /// Last update time in epoch milliseconds
    pub updated_at: i64,
}

impl Snapshot {
    /// Validate the snapshot against the archive schema
    pub fn validate(&self) -> Result<(), SnapshotValidationError> {
        for (field, value) in [
            ("date", &self.date),
            ("created", &self.created),
            ("updated", &self.updated),
        ] {
            if parse_timestamp(value).is_none() {
                return Err(SnapshotValidationError::InvalidTimestamp {
                    field,
                    value: value.clone(),
                });
            }
        }

        if self.news.is_empty() {
            return Err(SnapshotValidationError::EmptyNews);
        }

        Ok(())
    }

    /// Calendar day of the `date` field, in the timezone it was written in
    pub fn calendar_day(&self) -> Option<NaiveDate> {
        parse_local_date(&self.date)
    }

    /// `YYYY-MM-DD` key of the `date` field
    ///
    /// Unparsable dates fall back to the text before any `T`.
    pub fn day_key(&self) -> String {
        match self.calendar_day() {
            Some(day) => day.format("%Y-%m-%d").to_string(),
            None => self
                .date
                .split('T')
                .next()
                .unwrap_or(&self.date)
                .to_string(),
        }
    }

    /// Parsed `updated` timestamp
    pub fn updated_time(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.updated)
    }

    /// Core content comparison: same calendar day and identical news list
    pub fn same_content(&self, other: &Snapshot) -> bool {
        self.day_key() == other.day_key() && self.news == other.news
    }
}

/// Validation errors for snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotValidationError {
    InvalidTimestamp { field: &'static str, value: String },
    EmptyNews,
}

impl fmt::Display for SnapshotValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTimestamp { field, value } => {
                write!(f, "Invalid timestamp in '{}': {:?}", field, value)
            }
            Self::EmptyNews => write!(f, "News list is empty"),
        }
    }
}

impl std::error::Error for SnapshotValidationError {}

/// Parse a timestamp in any of the formats the feed has been seen to emit
///
/// Naive values are taken as UTC. A bare date is midnight of that day.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }

    parse_naive(value).map(|naive| naive.and_utc())
}

/// Naive timestamp formats, tried in order
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Day of a timestamp as written, without converting offsets to UTC
pub fn parse_local_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.date_naive());
    }

    parse_naive(value).map(|naive| naive.date())
}
