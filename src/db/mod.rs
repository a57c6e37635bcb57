//! SQLite storage for decoded rows
//!
//! This module owns everything that touches the database: connection
//! setup, target table DDL, batch accumulation, and the transactional
//! writer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              Loader Driver                  │
//! │  - Decodes lines into typed rows            │
//! └─────────────────────┬───────────────────────┘
//!                       │ Row
//!                       ▼
//! ┌─────────────────────────────────────────────┐
//! │               RowBatch                      │
//! │  - Buffers rows up to the batch size        │
//! │  - Drained when full / at end of input      │
//! └─────────────────────┬───────────────────────┘
//!                       │ Vec<Row>
//!                       ▼
//! ┌─────────────────────────────────────────────┐
//! │              TableWriter                    │
//! │  - One prepared INSERT per batch            │
//! │  - One transaction per batch, all-or-none   │
//! └─────────────────────┬───────────────────────┘
//!                       │
//!                       ▼
//! ┌─────────────────────────────────────────────┐
//! │               SQLite File                   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! In dispatch mode the batch stage is skipped: each worker owns a
//! `TableWriter` and inserts rows one at a time in their own implicit
//! transactions.

pub mod batch;
pub mod schema;
pub mod writer;

pub use batch::RowBatch;
pub use schema::{configure_connection, create_table, insert_sql, table_exists};
pub use writer::TableWriter;
