//! CSV result sink
//!
//! Writes `result__{timestamp}__{start}-{end}.csv` with one header line
//! followed by every row in crawl order.

use crate::model::{OutputRow, PageRange};
use crate::output::traits::{ResultSink, WriteError, WriteResult};
use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Timestamp layout used in result file names
const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H_%M_%S";

/// Writes result files into a directory
#[derive(Debug, Clone)]
pub struct CsvSink {
    directory: PathBuf,
}

impl CsvSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// File name for a run started at `timestamp` over `range`
    pub fn file_name(timestamp: &DateTime<Local>, range: PageRange) -> String {
        format!(
            "result__{}__{}-{}.csv",
            timestamp.format(FILE_TIMESTAMP_FORMAT),
            range.start,
            range.end
        )
    }

    /// Writes `rows` to an explicit path
    ///
    /// The rows go to `{path}.partial` first, which is renamed to `path` once
    /// complete. A failed write leaves neither file behind.
    pub fn write_to(path: &Path, rows: &[OutputRow]) -> WriteResult<()> {
        let mut partial = path.as_os_str().to_owned();
        partial.push(".partial");
        let partial = PathBuf::from(partial);

        let result = write_rows(&partial, rows)
            .and_then(|()| fs::rename(&partial, path).map_err(WriteError::from));

        if result.is_err() {
            if let Err(e) = fs::remove_file(&partial) {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!("Failed to remove {}: {}", partial.display(), e);
                }
            }
        }
        result
    }

    fn write_at(
        &self,
        rows: &[OutputRow],
        range: PageRange,
        timestamp: &DateTime<Local>,
    ) -> WriteResult<PathBuf> {
        if rows.is_empty() {
            return Err(WriteError::NoRows(range));
        }

        let path = self.directory.join(Self::file_name(timestamp, range));
        Self::write_to(&path, rows)?;

        tracing::info!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(path)
    }
}

fn write_rows(path: &Path, rows: &[OutputRow]) -> WriteResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

impl ResultSink for CsvSink {
    fn write(&self, rows: &[OutputRow], range: PageRange) -> WriteResult<PathBuf> {
        self.write_at(rows, range, &Local::now())
    }
}
