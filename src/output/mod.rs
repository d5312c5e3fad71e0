//! Output module for persisting crawl results
//!
//! This module handles:
//! - The result sink trait and its CSV implementation
//! - Recording and displaying crawl statistics

mod csv_sink;
pub mod stats;
mod traits;

pub use csv_sink::CsvSink;
pub use stats::{log_statistics, print_runs, CrawlStatistics};
pub use traits::{ResultSink, WriteError, WriteResult};
