//! Row batch accumulator
//!
//! Buffers decoded rows until the configured batch size is reached, then
//! hands them to the writer as one transaction's worth of work. The
//! accumulator never writes; draining and flushing are the driver's job,
//! including the final short batch at end of input.

use crate::schema::Row;

/// Fixed-capacity accumulator for decoded rows
#[derive(Debug)]
pub struct RowBatch {
    rows: Vec<Row>,
    capacity: usize,
}

impl RowBatch {
    /// Create an empty batch with the given flush threshold
    pub fn new(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a row
    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// True once the batch has reached its capacity
    pub fn is_full(&self) -> bool {
        self.rows.len() >= self.capacity
    }

    /// Take the buffered rows, leaving the batch empty for reuse
    pub fn drain(&mut self) -> Vec<Row> {
        std::mem::replace(&mut self.rows, Vec::with_capacity(self.capacity))
    }

    /// Discard buffered rows without writing them
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
