//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output, including colored output,
//! progress tracking, and formatted tables.

use crate::events::{LogKind, LogLine};
use crate::preview::PreviewEntry;
use crate::pattern::MatchOutcome;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Run log lines colored by category
/// - Progress bars for runs
/// - Summary tables with per-group counts
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use namesort::output::OutputFormatter;
    /// OutputFormatter::error("Could not read journal");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Renders a run log line with its tag colored by category.
    pub fn log_line(line: &LogLine) -> String {
        let tag = line.kind.tag();
        let tag = match line.kind {
            LogKind::Start | LogKind::Info => tag.cyan(),
            LogKind::Moved | LogKind::Copied | LogKind::Restored => tag.green(),
            LogKind::Deleted => tag.magenta(),
            LogKind::Skipped => tag.dimmed(),
            LogKind::Error => tag.red().bold(),
            LogKind::Warning => tag.yellow(),
            LogKind::Done => tag.bold(),
            LogKind::Journal => tag.blue(),
        };
        format!("{} {}", tag, line.message)
    }

    /// Renders a previewed file name with the group-1 capture highlighted.
    pub fn preview_line(entry: &PreviewEntry) -> String {
        match &entry.outcome {
            MatchOutcome::Matched { span, .. } => {
                let (before, rest) = entry.name.split_at(span.start);
                let (target, after) = rest.split_at(span.end - span.start);
                format!(
                    " • {}{}{}",
                    before,
                    target.black().on_green(),
                    after
                )
            }
            MatchOutcome::NoGroup => format!(" • {} {}", entry.name, "(no group 1)".dimmed()),
            MatchOutcome::NoMatch => format!(" • {} {}", entry.name, "(no match)".dimmed()),
        }
    }

    /// Creates and returns a percentage progress bar.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use namesort::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar();
    /// pb.set_position(40);
    /// pb.finish_with_message("done");
    /// ```
    pub fn create_progress_bar() -> ProgressBar {
        let pb = ProgressBar::new(100);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints a summary table with file counts by group folder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use namesort::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("Alice".to_string(), 15);
    /// counts.insert("Bob".to_string(), 8);
    /// OutputFormatter::summary_table(&counts, 23);
    /// ```
    pub fn summary_table(group_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let max_group_len = group_counts
            .keys()
            .map(|name| name.chars().count())
            .max()
            .unwrap_or(0)
            .max(6);

        println!(
            "{:<width$} | {}",
            "Folder".bold(),
            "Files".bold(),
            width = max_group_len
        );
        println!("{}", "-".repeat(max_group_len + 10));

        for (group, count) in group_counts {
            let file_word = if *count == 1 { "file" } else { "files" };
            println!(
                "{:<width$} | {} {}",
                group,
                count.to_string().green(),
                file_word,
                width = max_group_len
            );
        }

        println!("{}", "-".repeat(max_group_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            if total_files == 1 { "file" } else { "files" },
            width = max_group_len
        );
    }
}
