//! Integrity, repair and retention CLI commands

use chrono::{NaiveDate, Utc};

use crate::archive::Archive;
use crate::display::{format_cleanup_report, format_integrity_report, format_repair_report};
use crate::error::ArchiveResult;
use crate::models::CompareMode;

/// Run an integrity check and print the report
pub fn handle_check_command(
    archive: &Archive,
    mode: Option<CompareMode>,
    json: bool,
) -> ArchiveResult<()> {
    let report = archive.check_integrity(mode)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_integrity_report(&report));
        if !report.is_ok() {
            println!();
            println!("Run 'sixty-archive repair' to fix what can be fixed.");
        }
    }
    Ok(())
}

/// Repair corrupted and diverged entries
pub fn handle_repair_command(archive: &Archive, mode: Option<CompareMode>) -> ArchiveResult<()> {
    let report = archive.repair(mode)?;
    print!("{}", format_repair_report(&report));
    Ok(())
}

/// Restore one primary entry from its backup
pub fn handle_restore_command(archive: &Archive, date: NaiveDate) -> ArchiveResult<()> {
    let path = archive.restore(date)?;
    println!("Restored {} from backup", path.display());
    Ok(())
}

/// Delete entries outside the retention window
pub fn handle_cleanup_command(archive: &Archive, days: Option<u32>) -> ArchiveResult<()> {
    let report = archive.cleanup(Utc::now(), days)?;
    print!("{}", format_cleanup_report(&report));
    Ok(())
}
