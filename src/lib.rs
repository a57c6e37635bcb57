//! tsv-loader - Bulk loader for delimited text into SQLite
//!
//! Reads a line-oriented delimited stream (TSV by default), converts each
//! record into a typed row according to a fixed column schema, and writes
//! the rows into a SQLite table. Designed for large feeds: bounded memory,
//! transactional batches, and an optional fixed worker pool.
//!
//! # Features
//!
//! - **Typed rows**: every field is converted to its declared column type
//!   (TEXT, INTEGER, FLOAT) before anything reaches the database; a line
//!   either becomes a complete row or fails as a unit.
//!
//! - **Transactional batches**: the default mode commits rows in batches
//!   of 5000 with one prepared statement per batch. A failed batch rolls
//!   back entirely; earlier batches stay committed.
//!
//! - **Dispatch pool**: the alternative mode inserts rows one at a time
//!   from a fixed pool of workers, skipping bad rows instead of aborting.
//!
//! - **Bound parameters everywhere**: values never appear in SQL text.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Delimited Input                      │
//! │                 (file or stdin, TSV)                    │
//! └────────────────────────────┬────────────────────────────┘
//!                              │ lines
//!                              ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                       Row Codec                         │
//! │        schema-driven: pairs lookup / header index       │
//! └────────────────────────────┬────────────────────────────┘
//!                              │ typed rows
//!            batch mode        │        dispatch mode
//!        ┌─────────────────────┴──────────────────────┐
//!        ▼                                            ▼
//! ┌───────────────────┐                  ┌───────────────────────┐
//! │     RowBatch      │                  │     DispatchPool      │
//! │  - fill to size   │                  │  - N workers          │
//! │  - drain to flush │                  │  - own connections    │
//! └─────────┬─────────┘                  │  - per-row inserts    │
//!           ▼                            └───────────┬───────────┘
//! ┌───────────────────┐                              │
//! │    TableWriter    │                              │
//! │  - 1 tx per batch │                              │
//! └─────────┬─────────┘                              │
//!           └──────────────────┬─────────────────────┘
//!                              ▼
//!                    ┌──────────────────┐
//!                    │    SQLite DB     │
//!                    │    (load.db)     │
//!                    └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # Load a TSV of name/value pairs in 5000-row transactions
//! tsv-loader data.tsv -t people -s 'id:INTEGER,name:TEXT' --create-table
//!
//! # Ten workers inserting rows independently, bad rows skipped
//! tsv-loader events.tsv -t events -s 'ts:INTEGER,msg:TEXT' --mode dispatch
//!
//! # Query results
//! sqlite3 load.db "SELECT name FROM people WHERE id > 100"
//! ```

pub mod codec;
pub mod config;
pub mod db;
pub mod error;
pub mod loader;
pub mod progress;
pub mod schema;

pub use config::{CliArgs, Layout, LoadConfig, Mode};
pub use error::{LoaderError, Result};
pub use loader::{LoadReport, Loader};
pub use schema::{Column, ColumnType, Row, Schema, Value};
