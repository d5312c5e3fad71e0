//! Crawl statistics
//!
//! Counters collected while crawling, plus the display helpers used at the
//! end of a run and by `--stats`.

use crate::storage::RunRecord;

/// Counters for one crawl, or one part of it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// City index pages fetched successfully
    pub index_pages_fetched: u64,

    /// City index pages whose fetch failed
    pub index_pages_failed: u64,

    /// Cities found on the index pages
    pub cities_found: u64,

    /// Cities skipped because their overview page failed
    pub cities_failed: u64,

    /// Categories found across all cities
    pub categories_found: u64,

    /// Categories skipped because their first listing page failed
    pub categories_failed: u64,

    /// Listing pages fetched successfully
    pub detail_pages_fetched: u64,

    /// Listing pages whose fetch failed
    pub detail_pages_failed: u64,

    /// Output rows produced
    pub rows: u64,
}

impl CrawlStatistics {
    /// Adds another set of counters to this one
    pub fn merge(&mut self, other: &CrawlStatistics) {
        self.index_pages_fetched += other.index_pages_fetched;
        self.index_pages_failed += other.index_pages_failed;
        self.cities_found += other.cities_found;
        self.cities_failed += other.cities_failed;
        self.categories_found += other.categories_found;
        self.categories_failed += other.categories_failed;
        self.detail_pages_fetched += other.detail_pages_fetched;
        self.detail_pages_failed += other.detail_pages_failed;
        self.rows += other.rows;
    }

    /// Total number of failed fetches at every level
    pub fn failures(&self) -> u64 {
        self.index_pages_failed
            + self.cities_failed
            + self.categories_failed
            + self.detail_pages_failed
    }
}

/// Writes the statistics of a finished crawl to the log
pub fn log_statistics(stats: &CrawlStatistics) {
    tracing::info!(
        "Index pages: {} fetched, {} failed",
        stats.index_pages_fetched,
        stats.index_pages_failed
    );
    tracing::info!(
        "Cities: {} found, {} failed",
        stats.cities_found,
        stats.cities_failed
    );
    tracing::info!(
        "Categories: {} found, {} failed",
        stats.categories_found,
        stats.categories_failed
    );
    tracing::info!(
        "Listing pages: {} fetched, {} failed",
        stats.detail_pages_fetched,
        stats.detail_pages_failed
    );
    tracing::info!("Rows collected: {}", stats.rows);
}

/// Prints the runs recorded in the row spool
///
/// # Arguments
///
/// * `runs` - Runs with their row counts, newest first
pub fn print_runs(runs: &[(RunRecord, u64)]) {
    println!("=== Spooled Runs ===\n");

    if runs.is_empty() {
        println!("No runs recorded.");
        return;
    }

    for (run, rows) in runs {
        println!(
            "  #{} pages {}-{} [{}] {} rows, started {}",
            run.id,
            run.range.start,
            run.range.end,
            run.status,
            rows,
            run.started_at
        );
        if let Some(path) = &run.output_path {
            println!("      -> {}", path);
        }
    }
}
