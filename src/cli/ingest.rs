//! Ingestion CLI commands

use std::path::Path;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use crate::archive::Archive;
use crate::error::{ArchiveError, ArchiveResult};
use crate::ingest::{parse_payload, Clock, FileSource, PollOutcome, PollResult, SystemClock};

/// Archive a payload file, bypassing the poll cursor
pub fn handle_ingest_command(
    archive: &Archive,
    file: &Path,
    date: Option<NaiveDate>,
) -> ArchiveResult<()> {
    let bytes = std::fs::read(file)
        .map_err(|e| ArchiveError::Io(format!("Failed to read {}: {}", file.display(), e)))?;
    let snapshot = parse_payload(&bytes)?;

    let written = archive.write(&snapshot, date)?;
    println!("Archived {} news item(s)", snapshot.news.len());
    println!("Primary: {}", written.primary.display());
    println!("Backup:  {}", written.backup.display());
    Ok(())
}

fn print_outcome(outcome: &PollOutcome) {
    match &outcome.result {
        PollResult::Archived { date, write } => {
            println!("Archived new snapshot for {}", date);
            println!("Primary: {}", write.primary.display());
        }
        PollResult::UpToDate => println!("No new data."),
    }
}

/// Poll a payload file once, or keep polling on the configured schedule
pub fn handle_poll_command(archive: &Archive, file: &Path, now: bool) -> ArchiveResult<()> {
    let source = FileSource::new(file);

    if now {
        let outcome = archive.poll(&source, SystemClock)?;
        print_outcome(&outcome);
        return Ok(());
    }

    let policy = &archive.settings().schedule;
    loop {
        let current = SystemClock.now();
        let next = policy.next_run(current)?;
        let wait = (next - current).to_std().unwrap_or_default();

        info!(next = %next, "waiting for next poll");
        std::thread::sleep(wait);

        match archive.poll(&source, SystemClock) {
            Ok(outcome) => print_outcome(&outcome),
            Err(e) => warn!(error = %e, "poll attempt failed"),
        }
    }
}

/// Show the next scheduled poll times
pub fn handle_next_run_command(archive: &Archive, count: usize) -> ArchiveResult<()> {
    let policy = &archive.settings().schedule;
    let offset = policy.offset()?;
    let runs = policy.upcoming(Utc::now(), count)?;

    println!("Upcoming polls (UTC{})", offset);
    for run in runs {
        println!(
            "  {}  ({})",
            run.with_timezone(&offset).format("%Y-%m-%d %H:%M"),
            run.format("%Y-%m-%d %H:%M UTC")
        );
    }

    let cursor = archive.cursor_store().load()?;
    match cursor.last_update {
        Some(updated) => println!("Last archived update: {}", updated),
        None => println!("No snapshot archived by polling yet."),
    }
    Ok(())
}
