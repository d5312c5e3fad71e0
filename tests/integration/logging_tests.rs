//! Log file tests
//!
//! Kept in their own binary: `logging::init` installs the global subscriber,
//! which can only happen once per process.

mod support;

use ctrip_sights::crawler::run_crawl;
use ctrip_sights::logging;
use ctrip_sights::PageRange;
use std::path::Path;
use support::*;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::MockServer;

#[tokio::test]
async fn test_failed_city_is_logged_as_warning() {
    let mock_server = MockServer::start().await;
    mount_scenario(&mock_server).await;

    let out_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), out_dir.path());

    let log_guard = logging::init(Path::new(&config.output.log_path), 0, true)
        .expect("Failed to install logging");

    let file = run_crawl(&config, PageRange::new(1, 1), CancellationToken::new())
        .await
        .expect("Crawl should write a result file");
    assert_eq!(read_rows(&file).1.len(), 5);

    // Dropping the guard flushes the file
    drop(log_guard);

    let log = std::fs::read_to_string(&config.output.log_path).expect("Failed to read log file");
    let warning = log
        .lines()
        .find(|line| line.contains("Error getting city info for B"))
        .expect("City B's failure should be logged");

    assert!(warning.contains("WARN"));
    assert!(warning.contains(UNREACHABLE_CITY));
    // Lines start with an RFC 3339 timestamp
    assert!(warning.starts_with(|c: char| c.is_ascii_digit()));
    assert!(warning[..20].contains('T'));

    assert!(log.contains("Wrote 5 rows to"));
}
