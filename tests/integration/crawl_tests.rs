//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, from the first index page to the CSV file.

mod support;

use ctrip_sights::crawler::run_crawl;
use ctrip_sights::output::WriteError;
use ctrip_sights::storage::{open_storage, RowStore, RunStatus};
use ctrip_sights::{PageRange, SightError};
use std::time::Duration;
use support::*;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_full_crawl_writes_flattened_rows() {
    let mock_server = MockServer::start().await;
    mount_scenario(&mock_server).await;

    let out_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), out_dir.path());

    let file = run_crawl(&config, PageRange::new(1, 1), CancellationToken::new())
        .await
        .expect("Crawl should write a result file");

    let file_name = file.file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("result__"));
    assert!(file_name.ends_with("__1-1.csv"));
    assert_eq!(file.parent().unwrap(), out_dir.path());

    let (header, rows) = read_rows(&file);
    assert_eq!(header, ["city", "category", "name", "address", "score"]);
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|r| r.city == "A" && r.category == "Parks"));

    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        ["West Lake", "Lingyin \"Temple\"", "Park 3", "Park 4", "Park 5"]
    );
    assert_eq!(rows[1].address, "2 Hill Rd, North");
    assert_eq!(rows[0].score, "4.7");
    assert_eq!(rows[4].address, "");
    assert_eq!(rows[4].score, "");
}

#[tokio::test]
async fn test_full_crawl_records_spooled_run() {
    let mock_server = MockServer::start().await;
    mount_scenario(&mock_server).await;

    let out_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), out_dir.path());

    let file = run_crawl(&config, PageRange::new(1, 1), CancellationToken::new())
        .await
        .expect("Crawl should write a result file");

    let store = open_storage(&out_dir.path().join("spool.db")).expect("Failed to open spool");
    let runs = store.list_runs().expect("Failed to list runs");
    assert_eq!(runs.len(), 1);

    let run = &runs[0];
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.range, PageRange::new(1, 1));
    assert_eq!(run.output_path, Some(file.to_string_lossy().to_string()));
    assert_eq!(store.count_rows(run.id).unwrap(), 5);
}

#[tokio::test]
async fn test_inverted_range_fails_to_write() {
    let mock_server = MockServer::start().await;
    mount_scenario(&mock_server).await;

    let out_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), out_dir.path());

    let result = run_crawl(&config, PageRange::new(2, 1), CancellationToken::new()).await;
    assert!(matches!(
        result,
        Err(SightError::Write(WriteError::NoRows(_)))
    ));

    let received = mock_server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty(), "No page should be fetched");

    let csv_files = std::fs::read_dir(out_dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "csv"))
        .count();
    assert_eq!(csv_files, 0);
}

#[tokio::test]
async fn test_failed_index_page_does_not_stop_crawl() {
    let mock_server = MockServer::start().await;

    // Page 1 answers too late; page 2 lists one city
    Mock::given(method("GET"))
        .and(path(format!("{}/p1.html", INDEX_PATH)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(index_html(&[("Z", "/sight/z0.html")]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        &format!("{}/p2.html", INDEX_PATH),
        index_html(&[("C", "/sight/c9.html")]),
    )
    .await;
    mount_page(&mock_server, "/sight/c9.html", city_html(&[("Museums", 7)])).await;
    mount_page(
        &mock_server,
        "/sight/c9/s7.html",
        listing_html(&[("Museum", "9 Rd", "4.0")], Some(1)),
    )
    .await;
    mount_page(
        &mock_server,
        "/sight/c9/s7-p1.html",
        listing_html(&[("Museum", "9 Rd", "4.0")], Some(1)),
    )
    .await;

    let out_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = create_test_config(&mock_server.uri(), out_dir.path());
    config.crawler.request_timeout_secs = 1;

    let file = run_crawl(&config, PageRange::new(1, 2), CancellationToken::new())
        .await
        .expect("Crawl should write a result file");

    let (_, rows) = read_rows(&file);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].city, "C");
    assert_eq!(rows[0].category, "Museums");
    assert!(file.to_string_lossy().ends_with("__1-2.csv"));
}

#[tokio::test]
async fn test_error_status_pages_are_parsed_not_skipped() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        &format!("{}/p1.html", INDEX_PATH),
        index_html(&[("A", "/sight/a1.html")]),
    )
    .await;
    mount_page(&mock_server, "/sight/a1.html", city_html(&[("Parks", 3)])).await;

    // The landing page is an error page without a page count
    mount_page_with_status(
        &mock_server,
        "/sight/a1/s3.html",
        404,
        "<html><body>Not found</body></html>".to_string(),
    )
    .await;
    mount_page(
        &mock_server,
        "/sight/a1/s3-p1.html",
        listing_html(&[("Botanical Garden", "7 Rd", "4.4")], None),
    )
    .await;

    let out_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), out_dir.path());

    let file = run_crawl(&config, PageRange::new(1, 1), CancellationToken::new())
        .await
        .expect("Crawl should write a result file");

    let (_, rows) = read_rows(&file);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Botanical Garden");
    assert_eq!(rows[0].category, "Parks");
}

#[tokio::test]
async fn test_missing_page_count_fetches_one_listing_page() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        &format!("{}/p1.html", INDEX_PATH),
        index_html(&[("A", "/sight/a1.html")]),
    )
    .await;
    mount_page(&mock_server, "/sight/a1.html", city_html(&[("Parks", 3)])).await;
    mount_page(
        &mock_server,
        "/sight/a1/s3.html",
        listing_html(&[("Only", "1 Rd", "5.0")], None),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/sight/a1/s3-p1.html"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(listing_html(&[("Only", "1 Rd", "5.0")], None)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sight/a1/s3-p2.html"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let out_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), out_dir.path());

    let file = run_crawl(&config, PageRange::new(1, 1), CancellationToken::new())
        .await
        .expect("Crawl should write a result file");

    let (_, rows) = read_rows(&file);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Only");

    mock_server.verify().await;
}

#[tokio::test]
async fn test_repeated_crawls_produce_identical_rows() {
    let mock_server = MockServer::start().await;
    mount_scenario(&mock_server).await;

    let first_dir = TempDir::new().expect("Failed to create temp dir");
    let second_dir = TempDir::new().expect("Failed to create temp dir");

    let mut first_config = create_test_config(&mock_server.uri(), first_dir.path());
    first_config.output.spool_path = None;
    let mut second_config = create_test_config(&mock_server.uri(), second_dir.path());
    second_config.output.spool_path = None;
    second_config.crawler.city_concurrency = 4;

    let first = run_crawl(&first_config, PageRange::new(1, 1), CancellationToken::new())
        .await
        .expect("First crawl should succeed");
    let second = run_crawl(&second_config, PageRange::new(1, 1), CancellationToken::new())
        .await
        .expect("Second crawl should succeed");

    assert_eq!(read_rows(&first).1, read_rows(&second).1);
}
