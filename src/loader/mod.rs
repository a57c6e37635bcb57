//! Load orchestration
//!
//! This module implements the run loop that turns an input stream into
//! committed table rows, in one of two modes.
//!
//! # Architecture
//!
//! ```text
//!                     ┌─────────────────────────┐
//!                     │         Loader          │
//!                     │  - reads lines          │
//!                     │  - batch: decode+flush  │
//!                     │  - dispatch: submit     │
//!                     └───────────┬─────────────┘
//!                                 │ (dispatch mode)
//!       ┌─────────────────────────┼─────────────────────────┐
//!       │                         │                         │
//! ┌─────▼─────┐             ┌─────▼─────┐             ┌─────▼─────┐
//! │  Worker 1 │             │  Worker 2 │             │  Worker N │
//! │  decode   │             │  decode   │             │  decode   │
//! │  insert   │             │  insert   │             │  insert   │
//! └───────────┘             └───────────┘             └───────────┘
//! ```

pub mod driver;
pub mod pool;

pub use driver::{LoadReport, Loader};
pub use pool::{DispatchJob, DispatchPool, DispatchStats};
