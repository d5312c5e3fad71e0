//! Storage traits and error types
//!
//! This module defines the trait interface for the row spool and its error
//! type.

use crate::model::{OutputRow, PageRange};
use crate::storage::{RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable buffer for the rows of each crawl run
///
/// Rows are appended while the crawl is still running, so they survive a
/// failed final write and can be exported again later.
pub trait RowStore {
    // ===== Run Management =====

    /// Records the start of a run
    ///
    /// # Arguments
    ///
    /// * `range` - City index pages the run covers
    /// * `config_hash` - Hash of the effective configuration
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn begin_run(&mut self, range: PageRange, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run as finished
    ///
    /// # Arguments
    ///
    /// * `run_id` - The run to update
    /// * `status` - Final status of the run
    /// * `output_path` - Where the rows were written, if they were
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        output_path: Option<&str>,
    ) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Lists all runs, newest first
    fn list_runs(&self) -> StorageResult<Vec<RunRecord>>;

    // ===== Rows =====

    /// Appends rows to a run, after any rows it already has
    fn append_rows(&mut self, run_id: i64, rows: &[OutputRow]) -> StorageResult<()>;

    /// Loads a run's rows in the order they were appended
    fn load_rows(&self, run_id: i64) -> StorageResult<Vec<OutputRow>>;

    /// Counts a run's rows
    fn count_rows(&self, run_id: i64) -> StorageResult<u64>;
}
