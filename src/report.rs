//! Report formatting and printing utilities.
//!
//! This module is separate from the core engine to allow lingua to be used
//! as a library without printing side effects.

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

/// Success mark for consistent output formatting
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓
/// Failure mark for consistent output formatting
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

use crate::core::record::{Status, TranslationRecord};
use crate::core::scan::{MAX_REPORTED_MESSAGES, ScanSummary};
use crate::utils::text_preview;

/// Print the outcome of a scan run.
pub fn print_scan_summary(summary: &ScanSummary) {
    for warning in &summary.warnings {
        eprintln!("{} {}", "warning:".bold().yellow(), warning);
    }
    if summary.warning_count > summary.warnings.len() {
        eprintln!(
            "{} (and {} more warnings)",
            "warning:".bold().yellow(),
            summary.warning_count - summary.warnings.len()
        );
    }

    for error in &summary.errors {
        eprintln!("{} {}", "error:".bold().red(), error);
    }
    if summary.error_count > summary.errors.len() {
        eprintln!(
            "{} (and {} more errors)",
            "error:".bold().red(),
            summary.error_count - summary.errors.len()
        );
    }

    let counts = format!(
        "{} created, {} updated, {} reactivated, {} marked unused",
        summary.created, summary.updated, summary.reactivated, summary.marked_unused
    );

    if summary.has_errors() {
        println!(
            "{} {}",
            FAILURE_MARK.red(),
            format!(
                "Scanned {} sources with {} errors - {}",
                summary.scanned_sources, summary.error_count, counts
            )
            .red()
        );
    } else {
        println!(
            "{} {}",
            SUCCESS_MARK.green(),
            format!(
                "Scanned {} sources, {} distinct strings - {}",
                summary.scanned_sources, summary.extracted_strings, counts
            )
            .green()
        );
    }
}

/// Print records as an aligned table plus per-status totals.
///
/// Column padding uses unicode display width so CJK text and emoji keep the
/// columns straight.
pub fn print_status_table(records: &[TranslationRecord]) {
    if records.is_empty() {
        println!("No records match.");
        return;
    }

    let rows = status_rows(records);

    let headers = ["LOCALE", "STATUS", "USES", "CATEGORY", "SOURCE TEXT"];
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }

    print_row(&headers.map(String::from), &widths, |s| s.bold().to_string());
    for (row, record) in rows.iter().zip(records) {
        let paint = status_color(record.status);
        print_row(row, &widths, paint);
    }

    println!();
    for status in [
        Status::Pending,
        Status::Translated,
        Status::Approved,
        Status::Unused,
    ] {
        let count = records.iter().filter(|r| r.status == status).count();
        if count > 0 {
            println!("  {:>5}  {}", count, status_color(status)(&status.to_string()));
        }
    }
    println!("  {:>5}  total", records.len());
}

fn status_rows(records: &[TranslationRecord]) -> Vec<[String; 5]> {
    records
        .iter()
        .map(|record| {
            [
                record.locale_id.clone(),
                record.status.to_string(),
                record.usage_count.to_string(),
                record.category.clone(),
                text_preview(&record.source_text, 48),
            ]
        })
        .collect()
}

fn print_row(cells: &[String; 5], widths: &[usize], paint: impl Fn(&str) -> String) {
    let mut line = String::new();
    for (i, cell) in cells.iter().enumerate() {
        line.push_str(&paint(cell));
        if i < cells.len() - 1 {
            let padding = widths[i].saturating_sub(cell.width()) + 2;
            line.push_str(&" ".repeat(padding));
        }
    }
    println!("{}", line);
}

fn status_color(status: Status) -> fn(&str) -> String {
    match status {
        Status::Pending => |s| s.yellow().to_string(),
        Status::Translated => |s| s.cyan().to_string(),
        Status::Approved => |s| s.green().to_string(),
        Status::Unused => |s| s.dimmed().to_string(),
    }
}

/// Hint shown when the capped message list hid details.
pub fn print_truncation_hint(summary: &ScanSummary) {
    let hidden = (summary.error_count + summary.warning_count)
        .saturating_sub(summary.errors.len() + summary.warnings.len());
    if hidden > 0 {
        eprintln!(
            "{} showing the first {} messages per kind",
            "note:".bold(),
            MAX_REPORTED_MESSAGES
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::core::record::{SourceKind, Status, TranslationRecord};
    use crate::report::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn record() -> TranslationRecord {
        let now = Utc::now();
        TranslationRecord {
            source_text: "Your name".to_string(),
            source_hash: "h1".to_string(),
            translation_key: "Your name".to_string(),
            locale_id: "ar".to_string(),
            category: "contact.name.label".to_string(),
            source_kind: SourceKind::Form,
            translated_text: String::new(),
            status: Status::Pending,
            usage_count: 3,
            last_seen_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_rows_include_usage_count() {
        let rows = status_rows(&[record()]);
        assert_eq!(
            rows[0],
            [
                "ar".to_string(),
                "pending".to_string(),
                "3".to_string(),
                "contact.name.label".to_string(),
                "Your name".to_string(),
            ]
        );
    }
}
