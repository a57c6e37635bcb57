//! tsv-loader - Bulk loader for delimited text into SQLite
//!
//! Entry point for the CLI application.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use tsv_loader::config::{CliArgs, LoadConfig};
use tsv_loader::loader::Loader;
use tsv_loader::progress::{print_header, print_summary, ProgressReporter};

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = LoadConfig::from_args(args).context("Invalid configuration")?;

    // Print header
    if config.show_progress {
        print_header(&config);
    }

    // Create progress reporter
    let progress = if config.show_progress {
        Some(ProgressReporter::new())
    } else {
        None
    };

    if let Some(ref p) = progress {
        p.set_status(&format!("Loading into '{}'...", config.table));
    }

    // Run the load over the configured input
    let loader = Loader::new(config.clone());
    let report = match &config.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Cannot open input '{}'", path.display()))?;
            loader.run(BufReader::new(file))
        }
        None => loader.run(io::stdin().lock()),
    }
    .context("Load failed")?;

    // Finish progress
    if let Some(ref p) = progress {
        p.finish_and_clear();
    }

    // Print summary - on failures too, so the committed counts surface
    let db_size = fs::metadata(&config.db_path).ok().map(|m| m.len());
    if config.show_progress {
        print_summary(&report, &config.db_path.display().to_string(), db_size);
    }

    if report.error.is_some() {
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("tsv_loader=debug,warn")
    } else {
        EnvFilter::new("tsv_loader=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
