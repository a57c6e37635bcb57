//! Loader driver - orchestrates a load run end to end
//!
//! The driver owns the pipeline: it prepares the target table, reads the
//! input line by line, and routes rows through one of two paths:
//!
//! - **batch** (default): decode on the driver thread, accumulate into a
//!   `RowBatch`, and commit a transaction per full batch. Any decode or
//!   write error is fatal; batches already committed stay committed and
//!   the report says how far the run got.
//! - **dispatch**: hand each line to a fixed worker pool that decodes and
//!   inserts rows independently. Bad rows are logged and counted; the run
//!   continues.
//!
//! The input reader is injected, so the driver works the same over a
//! file, stdin, or an in-memory buffer. Reaching end of input is normal
//! termination; only a genuine read failure is an I/O error.

use std::io::{self, BufRead};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::codec::{HeaderIndex, RowDecoder};
use crate::config::{Layout, LoadConfig, Mode};
use crate::db::{RowBatch, TableWriter};
use crate::error::{DbError, LoaderError, Result};
use crate::loader::pool::{DispatchJob, DispatchPool};

/// Result of a load run
///
/// Produced for failed runs too: a fatal error lands in `error` with the
/// counters reflecting everything committed before the failure.
#[derive(Debug)]
pub struct LoadReport {
    /// Data lines read from the input
    pub rows_read: u64,

    /// Rows durably committed to the table
    pub rows_committed: u64,

    /// Batches committed (zero in dispatch mode)
    pub batches_committed: u64,

    /// Rows skipped after per-row errors (dispatch mode)
    pub rows_failed: u64,

    /// Input bytes consumed
    pub bytes_read: u64,

    /// Wall-clock time for the run
    pub duration: Duration,

    /// Whether the input was fully consumed
    pub completed: bool,

    /// The fatal error, if the run aborted
    pub error: Option<LoaderError>,
}

impl LoadReport {
    /// Committed rows per second
    pub fn rows_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.rows_committed as f64 / secs
        } else {
            0.0
        }
    }
}

/// Mutable counters carried through a run
#[derive(Debug, Default)]
struct RunState {
    rows_read: u64,
    rows_committed: u64,
    batches_committed: u64,
    rows_failed: u64,
    bytes_read: u64,
    line_no: u64,
}

impl RunState {
    /// Account for one data line
    fn record_line(&mut self, line: &str) {
        self.line_no += 1;
        self.rows_read += 1;
        // +1 for the newline lines() strips
        self.bytes_read += line.len() as u64 + 1;
    }

    fn into_report(self, duration: Duration, error: Option<LoaderError>) -> LoadReport {
        LoadReport {
            rows_read: self.rows_read,
            rows_committed: self.rows_committed,
            batches_committed: self.batches_committed,
            rows_failed: self.rows_failed,
            bytes_read: self.bytes_read,
            duration,
            completed: error.is_none(),
            error,
        }
    }
}

/// Drives a load run against one input stream
pub struct Loader {
    config: LoadConfig,
}

impl Loader {
    /// Create a loader for the given configuration
    pub fn new(config: LoadConfig) -> Self {
        Self { config }
    }

    /// Run the load to completion
    ///
    /// Preparation failures (table missing, pool startup) return an error
    /// directly; once reading starts, a fatal error is carried inside the
    /// report so the committed-before-failure counters survive.
    pub fn run<R: BufRead>(&self, input: R) -> Result<LoadReport> {
        let start = Instant::now();
        let started_at: DateTime<Utc> = Utc::now();

        info!(
            table = %self.config.table,
            database = %self.config.db_path.display(),
            mode = %self.config.mode,
            layout = %self.config.layout,
            started_at = %started_at.to_rfc3339(),
            "Starting load"
        );

        // Prepare the target before reading anything
        let mut writer = TableWriter::open(&self.config.db_path, &self.config.table)?;
        if self.config.create_table {
            writer.create_table(&self.config.schema)?;
        } else if !writer.table_exists()? {
            return Err(DbError::TableMissing {
                table: self.config.table.clone(),
            }
            .into());
        }

        let mut lines = input.lines();
        let mut state = RunState::default();

        // The header layout consumes the first line up front
        let decoder = match self.build_decoder(&mut lines, &mut state) {
            Ok(decoder) => decoder,
            Err(e) => return Ok(self.finish(state, start, Some(e))),
        };

        let outcome = match self.config.mode {
            Mode::Batch => self.run_batch(&mut writer, &decoder, &mut lines, &mut state),
            Mode::Dispatch => self.run_dispatch(&decoder, &mut lines, &mut state),
        };

        Ok(self.finish(state, start, outcome.err()))
    }

    /// Build the row decoder for the configured layout
    fn build_decoder<B: BufRead>(
        &self,
        lines: &mut io::Lines<B>,
        state: &mut RunState,
    ) -> Result<RowDecoder> {
        match self.config.layout {
            Layout::Pairs => Ok(RowDecoder::pairs(
                self.config.schema.clone(),
                self.config.delimiter,
            )),
            Layout::Header => {
                let header = match lines.next() {
                    Some(line) => line?,
                    None => {
                        return Err(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            "input ended before the header line",
                        )
                        .into())
                    }
                };
                state.line_no += 1;
                state.bytes_read += header.len() as u64 + 1;

                let index =
                    HeaderIndex::build(&header, &self.config.schema, self.config.delimiter)
                        .map_err(|e| LoaderError::at_line(state.line_no, e))?;
                Ok(RowDecoder::positional(
                    self.config.schema.clone(),
                    self.config.delimiter,
                    index,
                ))
            }
        }
    }

    /// Batch path: accumulate, flush at capacity, fail fast
    fn run_batch<B: BufRead>(
        &self,
        writer: &mut TableWriter,
        decoder: &RowDecoder,
        lines: &mut io::Lines<B>,
        state: &mut RunState,
    ) -> Result<()> {
        let mut batch = RowBatch::new(self.config.batch_size);

        for line in lines {
            let line = line.map_err(|e| LoaderError::at_line(state.line_no + 1, e))?;
            state.record_line(&line);

            let row = decoder
                .decode(&line)
                .map_err(|e| LoaderError::at_line(state.line_no, e))?;
            batch.push(row);

            if batch.is_full() {
                self.flush(writer, &mut batch, state)?;
            }
        }

        // Final short batch at end of input
        if !batch.is_empty() {
            self.flush(writer, &mut batch, state)?;
        }

        Ok(())
    }

    /// Commit one batch and account for it
    fn flush(
        &self,
        writer: &mut TableWriter,
        batch: &mut RowBatch,
        state: &mut RunState,
    ) -> Result<()> {
        let rows = batch.drain();
        let written = writer
            .write_batch(&rows)
            .map_err(|e| LoaderError::at_line(state.line_no, e))?;
        state.rows_committed += written as u64;
        state.batches_committed += 1;
        Ok(())
    }

    /// Dispatch path: one line per pool submission, errors stay per-row
    fn run_dispatch<B: BufRead>(
        &self,
        decoder: &RowDecoder,
        lines: &mut io::Lines<B>,
        state: &mut RunState,
    ) -> Result<()> {
        let pool = DispatchPool::spawn(
            &self.config.db_path,
            &self.config.table,
            decoder,
            self.config.workers,
        )?;

        let mut outcome = Ok(());
        for line in lines {
            match line {
                Ok(line) => {
                    state.record_line(&line);
                    let job = DispatchJob {
                        line,
                        line_no: state.line_no,
                    };
                    if let Err(e) = pool.submit(job) {
                        outcome = Err(e.into());
                        break;
                    }
                }
                Err(e) => {
                    outcome = Err(LoaderError::at_line(state.line_no + 1, e));
                    break;
                }
            }
        }

        // Wait for in-flight rows even when the read loop aborted
        let stats = pool.join();
        state.rows_committed += stats.rows_inserted;
        state.rows_failed += stats.rows_failed;
        if stats.worker_failures > 0 && outcome.is_ok() {
            warn!(failures = stats.worker_failures, "Some workers exited abnormally");
        }

        outcome
    }

    /// Close out the run and build the report
    fn finish(&self, state: RunState, start: Instant, error: Option<LoaderError>) -> LoadReport {
        let duration = start.elapsed();

        match &error {
            None => info!(
                rows = state.rows_committed,
                batches = state.batches_committed,
                failed = state.rows_failed,
                duration_secs = duration.as_secs(),
                "Load completed"
            ),
            Some(e) => warn!(
                error = %e,
                rows_committed = state.rows_committed,
                batches_committed = state.batches_committed,
                "Load aborted"
            ),
        }

        state.into_report(duration, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn config(dir: &tempfile::TempDir, mode: Mode) -> LoadConfig {
        LoadConfig {
            input: None,
            table: "people".into(),
            db_path: dir.path().join("test.db"),
            schema: Schema::parse("id:INTEGER,name:TEXT").unwrap(),
            mode,
            batch_size: 2,
            workers: 2,
            delimiter: '\t',
            layout: Layout::Pairs,
            create_table: true,
            show_progress: false,
            verbose: false,
        }
    }

    fn count_rows(config: &LoadConfig) -> u64 {
        TableWriter::open(&config.db_path, &config.table)
            .unwrap()
            .count_rows()
            .unwrap()
    }

    #[test]
    fn test_batch_load() {
        let dir = tempdir().unwrap();
        let config = config(&dir, Mode::Batch);
        let input = Cursor::new("id\t1\tname\tAlice\nid\t2\tname\tBob\nid\t3\tname\tCarol\n");

        let report = Loader::new(config.clone()).run(input).unwrap();

        assert!(report.completed);
        assert!(report.error.is_none());
        assert_eq!(report.rows_read, 3);
        assert_eq!(report.rows_committed, 3);
        // Batch size 2: a full batch then the remainder
        assert_eq!(report.batches_committed, 2);
        assert_eq!(count_rows(&config), 3);
    }

    #[test]
    fn test_batch_mode_fails_fast() {
        let dir = tempdir().unwrap();
        let config = config(&dir, Mode::Batch);
        // Line 3 fails conversion; lines 1-2 were already committed as a
        // full batch, lines 4-5 must never load
        let input = Cursor::new(
            "id\t1\tname\tAlice\n\
             id\t2\tname\tBob\n\
             id\tbad\tname\tCarol\n\
             id\t4\tname\tDave\n\
             id\t5\tname\tEve\n",
        );

        let report = Loader::new(config.clone()).run(input).unwrap();

        assert!(!report.completed);
        let err = report.error.as_ref().unwrap();
        assert!(err.to_string().contains("line 3"));
        assert_eq!(report.rows_committed, 2);
        assert_eq!(report.batches_committed, 1);
        assert_eq!(count_rows(&config), 2);
    }

    #[test]
    fn test_empty_input_is_success() {
        let dir = tempdir().unwrap();
        let config = config(&dir, Mode::Batch);

        let report = Loader::new(config.clone()).run(Cursor::new("")).unwrap();

        assert!(report.completed);
        assert_eq!(report.rows_read, 0);
        assert_eq!(report.batches_committed, 0);
        assert_eq!(count_rows(&config), 0);
    }

    #[test]
    fn test_dispatch_load_continues_past_bad_rows() {
        let dir = tempdir().unwrap();
        let config = config(&dir, Mode::Dispatch);
        let input = Cursor::new(
            "id\t1\tname\tAlice\n\
             id\tbad\tname\tBob\n\
             id\t3\tname\tCarol\n\
             id\t4\n\
             id\t5\tname\tEve\n",
        );

        let report = Loader::new(config.clone()).run(input).unwrap();

        assert!(report.completed);
        assert!(report.error.is_none());
        assert_eq!(report.rows_read, 5);
        assert_eq!(report.rows_committed, 3);
        assert_eq!(report.rows_failed, 2);
        assert_eq!(count_rows(&config), 3);
    }

    #[test]
    fn test_dispatch_single_worker() {
        let dir = tempdir().unwrap();
        let mut config = config(&dir, Mode::Dispatch);
        config.workers = 1;
        let input = Cursor::new(
            "id\t1\tname\ta\nid\t2\tname\tb\nid\t3\tname\tc\nid\t4\tname\td\nid\t5\tname\te\n",
        );

        let report = Loader::new(config.clone()).run(input).unwrap();

        assert_eq!(report.rows_committed, 5);
        assert_eq!(count_rows(&config), 5);
    }

    #[test]
    fn test_missing_table_without_create() {
        let dir = tempdir().unwrap();
        let mut config = config(&dir, Mode::Batch);
        config.create_table = false;

        let err = Loader::new(config).run(Cursor::new("")).unwrap_err();
        assert!(matches!(
            err,
            LoaderError::Database(DbError::TableMissing { .. })
        ));
    }

    #[test]
    fn test_header_layout() {
        let dir = tempdir().unwrap();
        let mut config = config(&dir, Mode::Batch);
        config.layout = Layout::Header;
        // Columns reordered relative to the schema; decode is positional
        let input = Cursor::new("name\tid\nAlice\t1\nBob\t2\n");

        let report = Loader::new(config.clone()).run(input).unwrap();

        assert!(report.completed);
        assert_eq!(report.rows_read, 2);
        assert_eq!(report.rows_committed, 2);
        assert_eq!(count_rows(&config), 2);
    }

    #[test]
    fn test_header_layout_missing_column() {
        let dir = tempdir().unwrap();
        let mut config = config(&dir, Mode::Batch);
        config.layout = Layout::Header;
        // Header omits "name", so the index cannot be built
        let input = Cursor::new("id\textra\n1\tx\n");

        let report = Loader::new(config.clone()).run(input).unwrap();

        assert!(!report.completed);
        let err = report.error.as_ref().unwrap();
        assert!(err.to_string().contains("line 1"));
        assert!(err.to_string().contains("name"));
        assert_eq!(report.rows_read, 0);
        assert_eq!(count_rows(&config), 0);
    }

    #[test]
    fn test_header_layout_empty_input() {
        let dir = tempdir().unwrap();
        let mut config = config(&dir, Mode::Batch);
        config.layout = Layout::Header;

        let report = Loader::new(config).run(Cursor::new("")).unwrap();
        assert!(!report.completed);
        assert!(report.error.is_some());
        assert_eq!(report.rows_read, 0);
    }

    #[test]
    fn test_blank_line_is_a_row_error() {
        let dir = tempdir().unwrap();
        let config = config(&dir, Mode::Batch);
        let input = Cursor::new("id\t1\tname\tAlice\n\nid\t3\tname\tCarol\n");

        let report = Loader::new(config.clone()).run(input).unwrap();

        // Blank lines are not skipped; in batch mode they are fatal
        assert!(!report.completed);
        assert!(report.error.is_some());
    }
}
