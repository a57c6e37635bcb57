//! Dispatch worker pool for row-at-a-time loading
//!
//! Each worker:
//! - Has its own SQLite connection (connections are not shared across
//!   threads)
//! - Takes one line at a time from the job channel
//! - Decodes it and inserts the row in its own implicit transaction
//! - Logs and counts failed rows without affecting sibling rows
//!
//! Admission control: the job channel has zero capacity, so `submit`
//! completes only when a worker takes the job. At most `worker_count`
//! rows are ever in flight, and the caller blocks exactly when the pool
//! is saturated.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{debug, error, info, warn};

use crate::codec::RowDecoder;
use crate::db::TableWriter;
use crate::error::{Result, WorkerError};

/// One line of input handed to the pool
#[derive(Debug)]
pub struct DispatchJob {
    /// Raw record text
    pub line: String,

    /// 1-based input line number, for error reporting
    pub line_no: u64,
}

/// Statistics collected by a worker
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Rows decoded and inserted
    pub rows_inserted: AtomicU64,

    /// Rows skipped after a decode or insert error
    pub rows_failed: AtomicU64,
}

impl WorkerStats {
    fn record_inserted(&self) {
        self.rows_inserted.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failed(&self) {
        self.rows_failed.fetch_add(1, Ordering::Relaxed);
    }
}

/// A worker thread that processes dispatch jobs
pub struct PoolWorker {
    /// Worker ID
    id: usize,

    /// Thread handle
    handle: Option<JoinHandle<std::result::Result<(), WorkerError>>>,

    /// Worker statistics
    stats: Arc<WorkerStats>,
}

impl PoolWorker {
    /// Spawn a new worker thread
    pub fn spawn(
        id: usize,
        db_path: PathBuf,
        table: String,
        decoder: RowDecoder,
        jobs: Receiver<DispatchJob>,
    ) -> std::result::Result<Self, WorkerError> {
        let stats = Arc::new(WorkerStats::default());
        let stats_clone = Arc::clone(&stats);

        let handle = thread::Builder::new()
            .name(format!("loader-{}", id))
            .spawn(move || worker_loop(id, db_path, table, decoder, jobs, stats_clone))
            .map_err(|e| WorkerError::InitFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
            stats,
        })
    }

    /// Get worker statistics
    pub fn stats(&self) -> &WorkerStats {
        &self.stats
    }

    /// Wait for the worker to finish
    pub fn join(&mut self) -> std::result::Result<(), WorkerError> {
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(result) => result,
                Err(_) => Err(WorkerError::Panicked { id: self.id }),
            }
        } else {
            Ok(())
        }
    }
}

/// Main worker loop
fn worker_loop(
    id: usize,
    db_path: PathBuf,
    table: String,
    decoder: RowDecoder,
    jobs: Receiver<DispatchJob>,
    stats: Arc<WorkerStats>,
) -> std::result::Result<(), WorkerError> {
    debug!(worker = id, "Worker starting");

    // Open this worker's own connection
    let mut writer = match TableWriter::open(&db_path, &table) {
        Ok(writer) => writer,
        Err(e) => {
            error!(worker = id, error = %e, "Failed to open database connection");
            return Err(WorkerError::InitFailed {
                id,
                reason: e.to_string(),
            });
        }
    };

    // Runs until the pool drops its sender and the queue drains
    for job in jobs.iter() {
        match process_job(&mut writer, &decoder, &job) {
            Ok(()) => stats.record_inserted(),
            Err(e) => {
                warn!(worker = id, line = job.line_no, error = %e, "Row skipped");
                stats.record_failed();
            }
        }
    }

    debug!(
        worker = id,
        inserted = stats.rows_inserted.load(Ordering::Relaxed),
        failed = stats.rows_failed.load(Ordering::Relaxed),
        "Worker shutting down"
    );

    Ok(())
}

/// Decode one line and insert the row
fn process_job(writer: &mut TableWriter, decoder: &RowDecoder, job: &DispatchJob) -> Result<()> {
    let row = decoder.decode(&job.line)?;
    writer.insert_row(&row)?;
    Ok(())
}

/// Aggregated results from a drained pool
#[derive(Debug, Default, Clone, Copy)]
pub struct DispatchStats {
    /// Rows decoded and inserted across all workers
    pub rows_inserted: u64,

    /// Rows skipped after a decode or insert error
    pub rows_failed: u64,

    /// Workers that panicked or failed to initialize
    pub worker_failures: u64,
}

/// Fixed-size pool of dispatch workers
pub struct DispatchPool {
    workers: Vec<PoolWorker>,
    sender: Sender<DispatchJob>,
}

impl DispatchPool {
    /// Spawn `worker_count` workers, each with its own connection
    pub fn spawn(
        db_path: &Path,
        table: &str,
        decoder: &RowDecoder,
        worker_count: usize,
    ) -> std::result::Result<Self, WorkerError> {
        // Zero capacity: a send only completes when a worker is free
        let (sender, receiver) = bounded::<DispatchJob>(0);

        let mut workers = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            workers.push(PoolWorker::spawn(
                id,
                db_path.to_path_buf(),
                table.to_string(),
                decoder.clone(),
                receiver.clone(),
            )?);
        }

        info!(count = workers.len(), "Dispatch workers spawned");
        Ok(Self { workers, sender })
    }

    /// Submit one line for decoding and insertion
    ///
    /// Blocks while every worker is busy; returns once a worker has taken
    /// the job. Fails only if all workers have died.
    pub fn submit(&self, job: DispatchJob) -> std::result::Result<(), WorkerError> {
        self.sender.send(job).map_err(|_| WorkerError::Disconnected)
    }

    /// Close the pool and wait for all in-flight rows to finish
    pub fn join(self) -> DispatchStats {
        let DispatchPool {
            mut workers,
            sender,
        } = self;

        // Workers exit once the channel disconnects and drains
        drop(sender);

        let mut result = DispatchStats::default();
        for worker in &mut workers {
            if let Err(e) = worker.join() {
                warn!(error = %e, "Worker failed to join cleanly");
                result.worker_failures += 1;
            }
        }

        for worker in &workers {
            result.rows_inserted += worker.stats().rows_inserted.load(Ordering::Relaxed);
            result.rows_failed += worker.stats().rows_failed.load(Ordering::Relaxed);
        }

        result
    }
}
