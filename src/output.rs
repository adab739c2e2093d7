//! Output formatting for the command-line front end.
//!
//! Progress goes through `tracing` as leveled log lines; the end-of-run
//! summaries are printed to stdout with `colored`.

use crate::events::{Level, OrganizeEvent, Reporter};
use crate::undo::UndoReport;
use colored::*;
use std::collections::BTreeMap;
use tracing::{debug, error, info, warn};

/// Forwards organize and undo events to `tracing` at their own level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&mut self, event: OrganizeEvent) {
        match event.level() {
            Level::Debug => debug!("{}", event),
            Level::Info => info!("{}", event),
            Level::Warn => warn!("{}", event),
            Level::Error => error!("{}", event),
        }
    }
}

/// Prints end-of-run summaries.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a summary table of files per category.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use desksort::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("Documents".to_string(), 15);
    /// counts.insert("Images".to_string(), 8);
    /// OutputFormatter::summary_table(&counts);
    /// ```
    pub fn summary_table(category_counts: &BTreeMap<String, usize>) {
        Self::header("SUMMARY");

        let total_files: usize = category_counts.values().sum();
        let width = category_counts
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        for (category, count) in category_counts {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                plural(*count),
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files),
            width = width
        );
    }

    /// Prints the outcome of an undo.
    pub fn undo_summary(report: &UndoReport) {
        Self::header("UNDO");
        println!("  Restored: {}", report.restored_files.to_string().green());
        if !report.skipped_files.is_empty() {
            println!(
                "  Skipped:  {}",
                report.skipped_files.len().to_string().yellow()
            );
        }
        if !report.failed_restores.is_empty() {
            println!(
                "  Failed:   {}",
                report.failed_restores.len().to_string().red()
            );
        }
        println!("  Runs left in history: {}", report.remaining_runs);
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural() {
        assert_eq!(plural(1), "file");
        assert_eq!(plural(0), "files");
        assert_eq!(plural(2), "files");
    }
}
