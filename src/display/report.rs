//! Report formatting for terminal output

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::export::ArchiveStats;
use crate::models::{CleanupReport, EntryFailure, IntegrityReport, IntegrityStatus, RepairReport};

/// Format a byte count in human-readable units
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

fn status_label(status: IntegrityStatus) -> &'static str {
    match status {
        IntegrityStatus::Ok => "OK",
        IntegrityStatus::Warning => "WARNING",
        IntegrityStatus::Error => "ERROR",
    }
}

#[derive(Tabled)]
struct IssueRow {
    #[tabled(rename = "Issue")]
    kind: &'static str,
    #[tabled(rename = "Item")]
    item: String,
}

/// Format an integrity report: a status line and one row per finding
pub fn format_integrity_report(report: &IntegrityReport) -> String {
    let mut output = format!(
        "Integrity: {} ({} entr{} checked)\n",
        status_label(report.status),
        report.total_checked,
        if report.total_checked == 1 { "y" } else { "ies" }
    );

    let rows: Vec<IssueRow> = report
        .corrupted_files
        .iter()
        .map(|f| IssueRow {
            kind: "corrupted",
            item: f.clone(),
        })
        .chain(report.missing_dates.iter().map(|d| IssueRow {
            kind: "missing",
            item: d.clone(),
        }))
        .chain(report.backup_mismatches.iter().map(|f| IssueRow {
            kind: "backup mismatch",
            item: f.clone(),
        }))
        .collect();

    if !rows.is_empty() {
        output.push_str(&Table::new(rows).with(Style::psql()).to_string());
        output.push('\n');
    }

    output
}

#[derive(Tabled)]
struct RepairRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Action")]
    action: &'static str,
}

/// Format a repair report
pub fn format_repair_report(report: &RepairReport) -> String {
    let mut output = format!("{}\n", report.summary());

    let rows: Vec<RepairRow> = report
        .restored_from_backup
        .iter()
        .map(|f| RepairRow {
            file: f.clone(),
            action: "restored from backup",
        })
        .chain(report.repaired_files.iter().map(|f| RepairRow {
            file: f.clone(),
            action: "resynchronized",
        }))
        .chain(report.failed_files.iter().map(|f| RepairRow {
            file: f.clone(),
            action: "FAILED",
        }))
        .collect();

    if !rows.is_empty() {
        output.push_str(&Table::new(rows).with(Style::psql()).to_string());
        output.push('\n');
    }

    output
}

/// Format failures recorded by a batch operation
pub fn format_failures(failures: &[EntryFailure]) -> String {
    if failures.is_empty() {
        return String::new();
    }

    let mut output = format!(
        "{} entr{} could not be processed:\n",
        failures.len(),
        if failures.len() == 1 { "y" } else { "ies" }
    );
    for failure in failures {
        output.push_str(&format!("  {}: {}\n", failure.path.display(), failure.reason));
    }
    output
}

/// Format a cleanup report
pub fn format_cleanup_report(report: &CleanupReport) -> String {
    let mut output = if report.deleted.is_empty() {
        "No expired entries.\n".to_string()
    } else {
        let mut s = format!("Deleted {} file(s):\n", report.deleted.len());
        for path in &report.deleted {
            s.push_str(&format!("  {}\n", path.display()));
        }
        s
    };

    output.push_str(&format_failures(&report.failures));
    output
}

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// Format archive statistics as a two-column table
pub fn format_stats(stats: &ArchiveStats) -> String {
    let none = || "-".to_string();
    let rows = vec![
        StatRow {
            metric: "Entries",
            value: stats.total_files.to_string(),
        },
        StatRow {
            metric: "Total size",
            value: format_size(stats.total_size),
        },
        StatRow {
            metric: "Oldest",
            value: stats.oldest_date.clone().unwrap_or_else(none),
        },
        StatRow {
            metric: "Newest",
            value: stats.newest_date.clone().unwrap_or_else(none),
        },
        StatRow {
            metric: "News items",
            value: stats.news_count.to_string(),
        },
        StatRow {
            metric: "Avg per day",
            value: format!("{:.1}", stats.average_news_per_day),
        },
        StatRow {
            metric: "Compression",
            value: format!("{:.1}%", stats.compression_ratio * 100.0),
        },
        StatRow {
            metric: "Backups",
            value: format!(
                "{}/{} (need sync: {})",
                stats.backup_status.synchronized,
                stats.backup_status.total,
                stats.backup_status.need_sync
            ),
        },
    ];

    let mut output = Table::new(rows).with(Style::psql()).to_string();
    output.push('\n');
    output.push_str(&format_failures(&stats.failures));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_integrity_report_lists_findings() {
        let mut report = IntegrityReport {
            missing_dates: vec!["2025-03-02".into()],
            corrupted_files: vec!["2025-03-03.json.gz".into()],
            total_checked: 3,
            ..Default::default()
        };
        report.compute_status();

        let text = format_integrity_report(&report);
        assert!(text.starts_with("Integrity: ERROR (3 entries checked)"));
        assert!(text.contains("2025-03-02"));
        assert!(text.contains("corrupted"));
    }

    #[test]
    fn test_healthy_report_has_no_table() {
        let report = IntegrityReport {
            total_checked: 1,
            ..Default::default()
        };
        assert_eq!(
            format_integrity_report(&report),
            "Integrity: OK (1 entry checked)\n"
        );
    }

    #[test]
    fn test_cleanup_report() {
        let report = CleanupReport {
            deleted: vec![PathBuf::from("/a/2025-01-01.json")],
            failures: vec![EntryFailure::new("/a/2025-01-02.json", "busy")],
        };
        let text = format_cleanup_report(&report);
        assert!(text.contains("Deleted 1 file(s)"));
        assert!(text.contains("busy"));
    }

    #[test]
    fn test_stats_table() {
        let stats = ArchiveStats {
            total_files: 2,
            compression_ratio: 0.25,
            ..Default::default()
        };
        let text = format_stats(&stats);
        assert!(text.contains("Entries"));
        assert!(text.contains("25.0%"));
    }
}
