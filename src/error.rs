//! Error types for tsv-loader
//!
//! This module defines a comprehensive error hierarchy that covers:
//! - Row parsing and type conversion errors
//! - SQLite database errors
//! - Configuration and CLI errors
//! - Worker thread errors
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Errors should be actionable - include context about what to do
//! - Preserve error chains for debugging

use std::path::PathBuf;
use thiserror::Error;

use crate::schema::ColumnType;

/// Top-level error type for the tsv-loader application
#[derive(Error, Debug)]
pub enum LoaderError {
    /// Row parsing errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// I/O errors while reading input
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A fatal error tagged with the input line it occurred on
    #[error("line {line}: {source}")]
    Line {
        line: u64,
        #[source]
        source: Box<LoaderError>,
    },
}

impl LoaderError {
    /// Wrap an error with the 1-based input line number it occurred on
    pub fn at_line(line: u64, source: impl Into<LoaderError>) -> Self {
        LoaderError::Line {
            line,
            source: Box::new(source.into()),
        }
    }
}

/// Row parsing and type conversion errors
///
/// These are scoped to a single input line. The caller decides whether a
/// parse failure is fatal (batch mode) or skippable (dispatch mode); the
/// codec itself always returns them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Column name not found in the record's fields
    #[error("column '{column}' not found in record")]
    ColumnNotFound { column: String },

    /// Raw value could not be converted to the declared column type
    #[error("cannot convert '{value}' to {ty} for column '{column}'")]
    TypeConversion {
        column: String,
        value: String,
        ty: ColumnType,
    },
}

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to open database file
    #[error("Failed to open database at '{path}': {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    /// Target table does not exist
    #[error("Table '{table}' does not exist (use --create-table to create it)")]
    TableMissing { table: String },

    /// Attempted to write an empty batch
    #[error("Cannot write an empty batch")]
    EmptyBatch,

    /// Row columns do not match the batch's insert statement
    #[error("Row schema mismatch: {0}")]
    RowMismatch(String),
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Unsupported column type in the schema specification
    #[error("Unsupported column type '{ty}': must be TEXT, INTEGER, or FLOAT")]
    UnsupportedType { ty: String },

    /// Schema has no columns
    #[error("Schema must declare at least one column")]
    EmptySchema,

    /// Schema declares the same column twice
    #[error("Duplicate column '{column}' in schema")]
    DuplicateColumn { column: String },

    /// Name is not usable as a SQL identifier
    #[error("Invalid identifier '{name}': must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidIdentifier { name: String },

    /// Malformed entry in a --schema specification
    #[error("Invalid schema entry '{entry}': expected 'name:TYPE'")]
    InvalidSchemaSpec { entry: String },

    /// Schema file could not be read or parsed
    #[error("Cannot read schema file '{path}': {reason}")]
    SchemaFile { path: PathBuf, reason: String },

    /// Exactly one of --schema / --schema-file must be given
    #[error("Provide exactly one of --schema or --schema-file")]
    MissingSchema,

    /// Invalid batch size
    #[error("Invalid batch size {size}: must be between {min} and {max}")]
    InvalidBatchSize { size: usize, min: usize, max: usize },

    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Invalid field delimiter
    #[error("Invalid delimiter '{value}': must be a single character")]
    InvalidDelimiter { value: String },

    /// Input file missing or unreadable
    #[error("Cannot read input '{path}': {reason}")]
    InvalidInput { path: PathBuf, reason: String },

    /// Output path error
    #[error("Invalid database path '{path}': {reason}")]
    InvalidDatabasePath { path: PathBuf, reason: String },
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker initialization failed
    #[error("Failed to initialize worker {id}: {reason}")]
    InitFailed { id: usize, reason: String },

    /// Worker panicked
    #[error("Worker {id} panicked")]
    Panicked { id: usize },

    /// Job channel closed while submitting
    #[error("Dispatch channel closed unexpectedly")]
    Disconnected,
}

/// Result type alias for LoaderError
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Result type alias for ParseError
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Result type alias for DbError
pub type DbResult<T> = std::result::Result<T, DbError>;

/// Result type alias for ConfigError
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let parse_err = ParseError::ColumnNotFound {
            column: "id".into(),
        };
        let loader_err: LoaderError = parse_err.into();
        assert!(matches!(loader_err, LoaderError::Parse(_)));
    }

    #[test]
    fn test_line_wrapping() {
        let err = LoaderError::at_line(
            7,
            ParseError::TypeConversion {
                column: "id".into(),
                value: "abc".into(),
                ty: ColumnType::Integer,
            },
        );
        assert_eq!(
            err.to_string(),
            "line 7: Parse error: cannot convert 'abc' to INTEGER for column 'id'"
        );
    }

    #[test]
    fn test_db_error_display() {
        let err = DbError::TableMissing {
            table: "events".into(),
        };
        assert!(err.to_string().contains("--create-table"));
    }
}
