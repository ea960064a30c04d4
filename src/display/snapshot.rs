//! Snapshot and query result formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::export::QueryRecord;
use crate::models::Snapshot;

/// Format a single snapshot as a numbered news list
pub fn format_snapshot(snapshot: &Snapshot) -> String {
    let mut output = format!("{}\n", snapshot.day_key());
    output.push_str(&"=".repeat(10));
    output.push('\n');

    for (i, item) in snapshot.news.iter().enumerate() {
        output.push_str(&format!("{:>2}. {}\n", i + 1, item));
    }

    if !snapshot.tip.is_empty() {
        output.push_str(&format!("\nTip: {}\n", snapshot.tip));
    }
    output.push_str(&format!("Updated: {}\n", snapshot.updated));

    output
}

#[derive(Tabled)]
struct QueryRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "#")]
    count: usize,
    #[tabled(rename = "First item")]
    first: String,
}

/// Truncate to `max_chars` characters, adding an ellipsis when cut
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        ".".repeat(max_chars)
    } else {
        let head: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", head)
    }
}

/// Format query hits as a table, one row per date
pub fn format_query_records(records: &[QueryRecord]) -> String {
    if records.is_empty() {
        return "No matching entries.".to_string();
    }

    let rows: Vec<QueryRow> = records
        .iter()
        .map(|record| {
            let date = match record {
                QueryRecord::Full(snapshot) => snapshot.day_key(),
                QueryRecord::Matched { date, .. } => date.clone(),
            };
            QueryRow {
                date,
                count: record.news().len(),
                first: record
                    .news()
                    .first()
                    .map(|item| truncate(item, 60))
                    .unwrap_or_default(),
            }
        })
        .collect();

    Table::new(rows).with(Style::psql()).to_string()
}
