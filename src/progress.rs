//! Progress reporting for the loader
//!
//! Provides a spinner while a load runs and the header/summary blocks
//! printed around it.

use std::time::Duration;

use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::LoadConfig;
use crate::loader::LoadReport;

/// Spinner shown while a load is running
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("Invalid progress template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| {
            chunk
                .iter()
                .rev()
                .map(|&b| b as char)
                .collect::<String>()
        })
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a header at the start of the load
pub fn print_header(config: &LoadConfig) {
    let source = match &config.input {
        Some(path) => path.display().to_string(),
        None => "<stdin>".to_string(),
    };

    println!();
    println!(
        "{} {}",
        style("tsv-loader").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Input:").bold(), source);
    println!(
        "  {} {} ({})",
        style("Target:").bold(),
        config.table,
        config.db_path.display()
    );
    match config.mode {
        crate::config::Mode::Batch => println!(
            "  {} batch ({} rows/transaction)",
            style("Mode:").bold(),
            format_number(config.batch_size as u64)
        ),
        crate::config::Mode::Dispatch => println!(
            "  {} dispatch ({} workers)",
            style("Mode:").bold(),
            config.workers
        ),
    }
    println!();
}

/// Print a summary of the load results
///
/// Printed on failures too: the committed-before-failure counters are the
/// operator's record of how far the run got.
pub fn print_summary(report: &LoadReport, db_path: &str, db_size: Option<u64>) {
    let duration_secs = report.duration.as_secs_f64();

    println!();
    if report.completed {
        println!("{}", style("Load Complete").green().bold());
    } else {
        println!("{}", style("Load Failed").red().bold());
    }
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {}",
        style("Rows read:").bold(),
        format_number(report.rows_read)
    );
    println!(
        "  {} {}",
        style("Rows committed:").bold(),
        format_number(report.rows_committed)
    );
    if report.batches_committed > 0 {
        println!(
            "  {} {}",
            style("Batches:").bold(),
            format_number(report.batches_committed)
        );
    }
    if report.rows_failed > 0 {
        println!(
            "  {} {}",
            style("Rows skipped:").yellow().bold(),
            format_number(report.rows_failed)
        );
    }
    println!(
        "  {} {}",
        style("Bytes read:").bold(),
        format_size(report.bytes_read, BINARY)
    );
    println!(
        "  {} {:.1}s ({:.0} rows/sec)",
        style("Duration:").bold(),
        duration_secs,
        report.rows_per_second()
    );
    if let Some(size) = db_size {
        println!(
            "  {} {} ({})",
            style("Database:").bold(),
            db_path,
            format_size(size, BINARY)
        );
    } else {
        println!("  {} {}", style("Database:").bold(), db_path);
    }
    if let Some(error) = &report.error {
        println!("  {} {}", style("Error:").red().bold(), error);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(1234567890), "1,234,567,890");
    }
}
