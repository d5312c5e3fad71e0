//! Result sink trait and error types
//!
//! A sink receives the complete, flattened row set of a crawl and makes it
//! durable.

use crate::model::{OutputRow, PageRange};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while persisting the rows
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("No rows to write for pages {0}")]
    NoRows(PageRange),

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type WriteResult<T> = Result<T, WriteError>;

/// Persists the final row set of a crawl
pub trait ResultSink {
    /// Writes all rows in order, preceded by a header
    ///
    /// # Arguments
    ///
    /// * `rows` - Flattened rows in crawl order
    /// * `range` - The city index pages the rows were crawled from
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Where the rows were written
    /// * `Err(WriteError::NoRows)` - `rows` was empty; nothing was created
    /// * `Err(WriteError)` - The destination could not be created or written
    fn write(&self, rows: &[OutputRow], range: PageRange) -> WriteResult<PathBuf>;
}
