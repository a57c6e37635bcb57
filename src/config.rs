//! Configuration types for tsv-loader
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation
//! - Schema specification loading

use std::fmt;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{validate_identifier, Schema};

/// Maximum reasonable worker count
const MAX_WORKERS: usize = 512;

/// Batch size limits
const MIN_BATCH_SIZE: usize = 1;
const MAX_BATCH_SIZE: usize = 1_000_000;

/// Default rows per transaction in batch mode
pub const DEFAULT_BATCH_SIZE: usize = 5000;

/// Default worker count in dispatch mode
pub const DEFAULT_WORKERS: usize = 10;

/// Bulk loader for delimited text into SQLite
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tsv-loader",
    version,
    about = "Bulk loader for tab-delimited text into SQLite",
    long_about = "Reads delimited text line by line, converts each record into a typed row\n\
                  according to a fixed column schema, and writes the rows into a SQLite\n\
                  table either in transactional batches (default) or one at a time under\n\
                  a fixed worker pool.",
    after_help = "EXAMPLES:\n    \
        tsv-loader data.tsv -t people -s 'id:INTEGER,name:TEXT' --create-table\n    \
        tsv-loader data.tsv -t people --schema-file schema.json -o people.db\n    \
        tsv-loader data.tsv -t events -s 'ts:INTEGER,msg:TEXT' --mode dispatch -w 4\n    \
        cat data.tsv | tsv-loader - -t people -s 'id:INTEGER,name:TEXT'\n    \
        tsv-loader export.csv -t people -s 'id:INTEGER,name:TEXT' --delimiter ',' --layout header"
)]
pub struct CliArgs {
    /// Input file to load ('-' reads from stdin)
    #[arg(value_name = "INPUT")]
    pub input: String,

    /// Target table name
    #[arg(short = 't', long, value_name = "NAME")]
    pub table: String,

    /// Output SQLite database file
    #[arg(short = 'o', long, default_value = "load.db", value_name = "FILE")]
    pub output: PathBuf,

    /// Column schema as 'name:TYPE,...' (types: TEXT, INTEGER, FLOAT)
    #[arg(short = 's', long, value_name = "SPEC", conflicts_with = "schema_file")]
    pub schema: Option<String>,

    /// Column schema from a JSON file: [{"name": ..., "type": ...}, ...]
    #[arg(long, value_name = "FILE")]
    pub schema_file: Option<PathBuf>,

    /// Load mode
    #[arg(long, value_enum, default_value_t = Mode::Batch)]
    pub mode: Mode,

    /// Rows per transaction (batch mode)
    #[arg(short = 'b', long, default_value_t = DEFAULT_BATCH_SIZE, value_name = "NUM")]
    pub batch_size: usize,

    /// Number of worker threads (dispatch mode)
    #[arg(short = 'w', long, default_value_t = DEFAULT_WORKERS, value_name = "NUM")]
    pub workers: usize,

    /// Field delimiter ('\t' for tab)
    #[arg(long, default_value = "\t", value_name = "CHAR")]
    pub delimiter: String,

    /// Record layout
    #[arg(long, value_enum, default_value_t = Layout::Pairs)]
    pub layout: Layout,

    /// Create the target table from the schema if it does not exist
    #[arg(long)]
    pub create_table: bool,

    /// Quiet mode - suppress progress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (per-batch and per-worker logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// How rows reach the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Accumulate rows and commit them in transactional batches
    Batch,
    /// Insert rows one at a time from a fixed worker pool
    Dispatch,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Batch => write!(f, "batch"),
            Mode::Dispatch => write!(f, "dispatch"),
        }
    }
}

/// How records map fields to columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Layout {
    /// Fields are name/value pairs: each column name is followed by its value
    Pairs,
    /// First line names the columns; records are positional
    Header,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Pairs => write!(f, "pairs"),
            Layout::Header => write!(f, "header"),
        }
    }
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Input file path (None reads stdin)
    pub input: Option<PathBuf>,

    /// Target table name
    pub table: String,

    /// SQLite database path
    pub db_path: PathBuf,

    /// Column schema
    pub schema: Schema,

    /// Load mode
    pub mode: Mode,

    /// Rows per transaction (batch mode)
    pub batch_size: usize,

    /// Worker count (dispatch mode)
    pub workers: usize,

    /// Field delimiter
    pub delimiter: char,

    /// Record layout
    pub layout: Layout,

    /// Create the target table if absent
    pub create_table: bool,

    /// Show progress indicator
    pub show_progress: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl LoadConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> ConfigResult<Self> {
        validate_identifier(&args.table)?;

        // Exactly one schema source
        let schema = match (&args.schema, &args.schema_file) {
            (Some(spec), None) => Schema::parse(spec)?,
            (None, Some(path)) => Schema::from_file(path)?,
            _ => return Err(ConfigError::MissingSchema),
        };

        // Mode-specific limits are only checked for the active mode
        match args.mode {
            Mode::Batch => {
                if args.batch_size < MIN_BATCH_SIZE || args.batch_size > MAX_BATCH_SIZE {
                    return Err(ConfigError::InvalidBatchSize {
                        size: args.batch_size,
                        min: MIN_BATCH_SIZE,
                        max: MAX_BATCH_SIZE,
                    });
                }
            }
            Mode::Dispatch => {
                if args.workers == 0 || args.workers > MAX_WORKERS {
                    return Err(ConfigError::InvalidWorkerCount {
                        count: args.workers,
                        max: MAX_WORKERS,
                    });
                }
            }
        }

        let delimiter = parse_delimiter(&args.delimiter)?;

        // '-' reads stdin
        let input = if args.input == "-" {
            None
        } else {
            let path = PathBuf::from(&args.input);
            if !path.is_file() {
                return Err(ConfigError::InvalidInput {
                    path,
                    reason: "file does not exist".into(),
                });
            }
            Some(path)
        };

        // Validate database path
        if let Some(parent) = args.output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(ConfigError::InvalidDatabasePath {
                    path: args.output.clone(),
                    reason: format!("parent directory '{}' does not exist", parent.display()),
                });
            }
        }

        Ok(Self {
            input,
            table: args.table,
            db_path: args.output,
            schema,
            mode: args.mode,
            batch_size: args.batch_size,
            workers: args.workers,
            delimiter,
            layout: args.layout,
            create_table: args.create_table,
            show_progress: !args.quiet,
            verbose: args.verbose,
        })
    }
}

/// Parse the delimiter option into a single character
///
/// Accepts the two-character escape `\t` so shells don't need a literal
/// tab; newlines can never be delimiters.
fn parse_delimiter(value: &str) -> ConfigResult<char> {
    let resolved = match value {
        "\\t" => "\t",
        other => other,
    };

    let mut chars = resolved.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c != '\n' && c != '\r' => Ok(c),
        _ => Err(ConfigError::InvalidDelimiter {
            value: value.into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> ConfigResult<LoadConfig> {
        LoadConfig::from_args(CliArgs::parse_from(argv))
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["tsv-loader", "-", "-t", "people", "-s", "id:INTEGER"]).unwrap();

        assert_eq!(config.input, None);
        assert_eq!(config.table, "people");
        assert_eq!(config.db_path, PathBuf::from("load.db"));
        assert_eq!(config.mode, Mode::Batch);
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert_eq!(config.delimiter, '\t');
        assert_eq!(config.layout, Layout::Pairs);
        assert!(!config.create_table);
        assert!(config.show_progress);
    }

    #[test]
    fn test_requires_schema() {
        let err = parse(&["tsv-loader", "-", "-t", "people"]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSchema));
    }

    #[test]
    fn test_rejects_invalid_table_name() {
        let err = parse(&["tsv-loader", "-", "-t", "no spaces", "-s", "id:INTEGER"]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_batch_size_checked_in_batch_mode() {
        let err = parse(&[
            "tsv-loader",
            "-",
            "-t",
            "people",
            "-s",
            "id:INTEGER",
            "--batch-size",
            "0",
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBatchSize { .. }));
    }

    #[test]
    fn test_workers_checked_in_dispatch_mode() {
        let err = parse(&[
            "tsv-loader",
            "-",
            "-t",
            "people",
            "-s",
            "id:INTEGER",
            "--mode",
            "dispatch",
            "-w",
            "0",
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWorkerCount { .. }));
    }

    #[test]
    fn test_inactive_mode_limits_not_checked() {
        // Batch is the active mode, so a worker count that would be
        // rejected in dispatch mode passes untouched
        let config = parse(&[
            "tsv-loader",
            "-",
            "-t",
            "people",
            "-s",
            "id:INTEGER",
            "-w",
            "0",
        ])
        .unwrap();
        assert_eq!(config.workers, 0);

        // And the reverse: dispatch mode ignores the batch size
        let config = parse(&[
            "tsv-loader",
            "-",
            "-t",
            "people",
            "-s",
            "id:INTEGER",
            "--mode",
            "dispatch",
            "--batch-size",
            "0",
        ])
        .unwrap();
        assert_eq!(config.batch_size, 0);
    }

    #[test]
    fn test_delimiter_parsing() {
        assert_eq!(parse_delimiter("\t").unwrap(), '\t');
        assert_eq!(parse_delimiter("\\t").unwrap(), '\t');
        assert_eq!(parse_delimiter(",").unwrap(), ',');
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("\n").is_err());
    }

    #[test]
    fn test_missing_input_file() {
        let err = parse(&[
            "tsv-loader",
            "/nonexistent/input.tsv",
            "-t",
            "people",
            "-s",
            "id:INTEGER",
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidInput { .. }));
    }

    #[test]
    fn test_schema_errors_surface() {
        let err = parse(&["tsv-loader", "-", "-t", "people", "-s", "id:UUID"]).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedType { .. }));
    }
}
