//! Crawler module for fetching and flattening the sight listings
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with an optional retry policy
//! - HTML extraction for index, city and listing pages
//! - The three-level crawl orchestration
//! - Running a crawl end to end, from the first fetch to the result file

mod extractor;
mod fetcher;
mod orchestrator;

pub use extractor::{DetailPage, ListingExtractor};
pub use fetcher::{
    build_http_client, fetch_with_retry, FetchError, HttpFetcher, PageFetcher, RawPage,
    RetryPolicy,
};
pub use orchestrator::{CrawlReport, Orchestrator};

use crate::config::{compute_config_hash, Config};
use crate::model::PageRange;
use crate::output::{log_statistics, CsvSink, ResultSink};
use crate::storage::{open_storage, RowStore, RunStatus};
use crate::Result;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl and writes the result file
///
/// This is the main entry point for a crawl. It will:
/// 1. Build the HTTP fetcher and extractor from the configuration
/// 2. Open the row spool, if enabled
/// 3. Crawl the city index pages in `range`
/// 4. Write all rows to `result__{timestamp}__{start}-{end}.csv`
/// 5. Record the run's final status in the spool
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `range` - City index pages to crawl
/// * `cancel` - Checked between units of work
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written result file
/// * `Err(SightError)` - Setup failed, or the result file could not be written
pub async fn run_crawl(
    config: &Config,
    range: PageRange,
    cancel: CancellationToken,
) -> Result<PathBuf> {
    let mut orchestrator = Orchestrator::from_config(config)?.with_cancellation(cancel);

    if let Some(spool) = config.output.spool() {
        match open_storage(Path::new(spool)) {
            Ok(store) => {
                orchestrator =
                    orchestrator.with_store(Box::new(store), compute_config_hash(config)?);
            }
            Err(e) => tracing::warn!("Row spool {} unavailable: {}", spool, e),
        }
    }

    let report = orchestrator.run(range).await;
    log_statistics(&report.stats);

    let sink = CsvSink::new(&config.output.directory);
    match sink.write(&report.rows, range) {
        Ok(path) => {
            let status = if report.cancelled {
                RunStatus::Interrupted
            } else {
                RunStatus::Completed
            };
            let output_path = path.to_string_lossy().into_owned();
            orchestrator.finish_run(&report, status, Some(output_path.as_str()));
            Ok(path)
        }
        Err(e) => {
            orchestrator.finish_run(&report, RunStatus::Failed, None);
            if let (Some(run_id), false) = (report.run_id, report.rows.is_empty()) {
                tracing::error!(
                    "{} rows kept in the spool as run {}; re-export with --export-run {}",
                    report.rows.len(),
                    run_id,
                    run_id
                );
            }
            Err(e.into())
        }
    }
}

/// Writes the rows of a spooled run to a new result file
///
/// # Arguments
///
/// * `store` - The row spool
/// * `run_id` - Run to export
/// * `sink` - Where the rows are written
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written result file
/// * `Err(SightError)` - Unknown run, no rows, or the write failed
pub fn export_run(
    store: &mut dyn RowStore,
    run_id: i64,
    sink: &dyn ResultSink,
) -> Result<PathBuf> {
    let run = store.get_run(run_id)?;
    let rows = store.load_rows(run_id)?;
    tracing::info!("Exporting {} rows of run {}", rows.len(), run_id);

    let path = sink.write(&rows, run.range)?;

    // An interrupted run stays interrupted; anything else now has its file
    let status = match run.status {
        RunStatus::Interrupted => RunStatus::Interrupted,
        _ => RunStatus::Completed,
    };
    let output_path = path.to_string_lossy().into_owned();
    store.finish_run(run_id, status, Some(output_path.as_str()))?;

    Ok(path)
}
