use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sixty_archive::archive::Archive;
use sixty_archive::cli::{
    handle_check_command, handle_cleanup_command, handle_export_command, handle_ingest_command,
    handle_next_run_command, handle_poll_command, handle_query_command, handle_read_command,
    handle_repair_command, handle_restore_command, handle_stats_command, parse_date_arg,
};
use sixty_archive::config::ArchivePaths;
use sixty_archive::export::{ExportFormat, QueryOptions};
use sixty_archive::models::CompareMode;

#[derive(Parser)]
#[command(
    name = "sixty-archive",
    version,
    about = "Local archive for the daily 60-second news digest",
    long_about = "sixty-archive keeps one snapshot of the daily 60-second news digest \
                  per day, mirrors every entry into a backup directory, enforces a \
                  retention window and repairs corrupted or diverged entries."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the archive directories and config file
    Init,

    /// Show current configuration and paths
    Config,

    /// Archive a payload file
    Ingest {
        /// Path to a snapshot JSON file (bare or API envelope)
        file: PathBuf,
        /// File under this date instead of the snapshot's own (YYYY-MM-DD)
        #[arg(short, long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },

    /// Poll a payload file on the configured schedule
    Poll {
        /// Path the fetcher writes the latest payload to
        file: PathBuf,
        /// Make one attempt right away and exit
        #[arg(long)]
        now: bool,
    },

    /// Show upcoming scheduled polls
    NextRun {
        /// How many runs to list
        #[arg(short, long, default_value = "5")]
        count: usize,
    },

    /// Print the snapshot for a date
    Read {
        /// Date (YYYY-MM-DD)
        #[arg(value_parser = parse_date_arg)]
        date: NaiveDate,
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace the primary entry for a date with its backup
    Restore {
        /// Date (YYYY-MM-DD)
        #[arg(value_parser = parse_date_arg)]
        date: NaiveDate,
    },

    /// Check continuity, corruption and backup consistency
    Check {
        /// Backup comparison mode (strict or loose)
        #[arg(short, long)]
        mode: Option<CompareMode>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Restore corrupted entries and resync diverged backups
    Repair {
        /// Backup comparison mode (strict or loose)
        #[arg(short, long)]
        mode: Option<CompareMode>,
    },

    /// Delete entries older than the retention window
    Cleanup {
        /// Override the configured retention in days
        #[arg(short, long)]
        days: Option<u32>,
    },

    /// Search stored entries
    Query {
        /// First date to include (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        from: Option<NaiveDate>,
        /// Last date to include (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        to: Option<NaiveDate>,
        /// Only news items containing this text (case-insensitive)
        #[arg(short, long)]
        keyword: Option<String>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export stored entries to a new file
    Export {
        /// Output format: json, csv, markdown or yaml
        format: ExportFormat,
        /// First date to include (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        from: Option<NaiveDate>,
        /// Last date to include (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        to: Option<NaiveDate>,
    },

    /// Show archive statistics
    Stats {
        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,sixty_archive=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,sixty_archive=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let paths = ArchivePaths::new()?;
    let archive = Archive::load(paths.clone())?;

    match cli.command {
        Some(Commands::Init) => {
            println!("Initializing archive at: {}", paths.base_dir().display());
            archive.init()?;
            println!("Primary: {}", archive.synchronizer().primary().dir().display());
            println!("Backup:  {}", archive.synchronizer().backup().dir().display());
            println!("Initialization complete!");
        }
        Some(Commands::Config) => {
            let settings = archive.settings();
            println!("sixty-archive Configuration");
            println!("===========================");
            println!("Base directory:    {}", paths.base_dir().display());
            println!("Settings file:     {}", paths.settings_file().display());
            println!("Primary directory: {}", archive.synchronizer().primary().dir().display());
            println!("Backup directory:  {}", archive.synchronizer().backup().dir().display());
            println!("Exports directory: {}", archive.exports_dir().display());
            println!();
            println!("Settings:");
            println!("  Retention days:  {}", settings.archive.retention_days);
            println!("  Compression:     {}", settings.archive.compression_enabled);
            println!("  Comparison mode: {}", settings.archive.comparison_mode);
            println!(
                "  Schedule:        every {} min, anchors {}, UTC offset {} min",
                settings.schedule.poll_interval_minutes,
                settings.schedule.anchors.join(", "),
                settings.schedule.utc_offset_minutes
            );
        }
        Some(Commands::Ingest { file, date }) => handle_ingest_command(&archive, &file, date)?,
        Some(Commands::Poll { file, now }) => handle_poll_command(&archive, &file, now)?,
        Some(Commands::NextRun { count }) => handle_next_run_command(&archive, count)?,
        Some(Commands::Read { date, json }) => handle_read_command(&archive, date, json)?,
        Some(Commands::Restore { date }) => handle_restore_command(&archive, date)?,
        Some(Commands::Check { mode, json }) => handle_check_command(&archive, mode, json)?,
        Some(Commands::Repair { mode }) => handle_repair_command(&archive, mode)?,
        Some(Commands::Cleanup { days }) => handle_cleanup_command(&archive, days)?,
        Some(Commands::Query {
            from,
            to,
            keyword,
            json,
        }) => {
            let options = QueryOptions {
                start_date: from,
                end_date: to,
                keyword,
            };
            handle_query_command(&archive, options, json)?
        }
        Some(Commands::Export { format, from, to }) => {
            handle_export_command(&archive, format, from, to)?
        }
        Some(Commands::Stats { json }) => handle_stats_command(&archive, json)?,
        None => {
            println!("sixty-archive - daily 60-second news archive");
            println!();
            println!("Run 'sixty-archive --help' for usage information.");
        }
    }

    Ok(())
}
