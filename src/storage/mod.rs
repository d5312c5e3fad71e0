//! Storage module for the row spool
//!
//! This module persists the rows of each crawl run while the crawl is running:
//! - The SQLite schema of the spool
//! - Run tracking (range, config hash, status, output file)
//! - Row buffering and re-export

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{RowStore, StorageError, StorageResult};

use crate::model::PageRange;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Opens or creates a spool database
///
/// The database is created with its tables if `path` does not exist yet.
pub fn open_storage(path: &Path) -> StorageResult<SqliteStore> {
    SqliteStore::new(path)
}

/// One crawl as recorded in the spool
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    /// RFC 3339, UTC
    pub started_at: String,
    pub finished_at: Option<String>,
    /// City index pages the run covered
    pub range: PageRange,
    pub config_hash: String,
    pub status: RunStatus,
    /// Result file written for the run, once there is one
    pub output_path: Option<String>,
}

/// Lifecycle of a spooled run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Crawl in progress, or the process died mid-run
    Running,
    /// Rows written to the result file
    Completed,
    /// Cancelled before all pages were crawled
    Interrupted,
    /// The result file could not be written
    Failed,
}

impl RunStatus {
    /// Name stored in the `status` column
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Running, Self::Completed, Self::Interrupted, Self::Failed]
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown run status '{}'", s))
    }
}
