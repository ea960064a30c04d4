//! Read, query, export and statistics CLI commands

use chrono::NaiveDate;

use crate::archive::Archive;
use crate::display::{format_failures, format_query_records, format_snapshot, format_stats};
use crate::error::ArchiveResult;
use crate::export::{ExportFormat, QueryOptions};

/// Print one day's snapshot
pub fn handle_read_command(archive: &Archive, date: NaiveDate, json: bool) -> ArchiveResult<()> {
    let snapshot = archive.read(date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", format_snapshot(&snapshot));
    }
    Ok(())
}

/// Query by date range and keyword
pub fn handle_query_command(
    archive: &Archive,
    options: QueryOptions,
    json: bool,
) -> ArchiveResult<()> {
    let outcome = archive.query(&options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.records)?);
    } else {
        println!("{}", format_query_records(&outcome.records));
    }

    eprint!("{}", format_failures(&outcome.failures));
    Ok(())
}

/// Export entries in range to a new file
pub fn handle_export_command(
    archive: &Archive,
    format: ExportFormat,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> ArchiveResult<()> {
    let outcome = archive.export(format, from, to)?;

    println!(
        "Exported {} day(s) as {} to: {}",
        outcome.records,
        format,
        outcome.path.display()
    );
    eprint!("{}", format_failures(&outcome.failures));
    Ok(())
}

/// Show archive statistics
pub fn handle_stats_command(archive: &Archive, json: bool) -> ArchiveResult<()> {
    let stats = archive.stats()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print!("{}", format_stats(&stats));
    }
    Ok(())
}
