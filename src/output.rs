//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output: colored status
//! lines, a progress bar over manifest records, and the end-of-run summary
//! table. Keeping output here makes it easy to restyle globally.

use crate::engine::RunStats;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
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

    /// Prints a per-record progress line, `[i/total] Processing: name`.
    pub fn record_progress(index: usize, total: usize, declared_name: &str) {
        println!(
            "{} Processing: {}",
            format!("[{}/{}]", index, total).bold(),
            declared_name
        );
    }

    /// Creates a progress bar sized to the manifest record count.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Prints the end-of-run summary tallies.
    pub fn summary(stats: &RunStats) {
        Self::header("Organization complete!");
        println!("  • Files moved: {}", stats.moved.to_string().green());
        println!(
            "  • Secondary links created: {}",
            stats.linked.to_string().green()
        );
        let skipped = if stats.skipped > 0 {
            stats.skipped.to_string().yellow()
        } else {
            stats.skipped.to_string().green()
        };
        println!("  • Files skipped: {}", skipped);
    }
}
