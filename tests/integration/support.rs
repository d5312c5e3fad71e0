//! Shared fixtures for the integration tests
//!
//! Builds the three page shapes of the site and mounts them on a wiremock
//! server.

#![allow(dead_code)]

use ctrip_sights::config::{Config, CrawlerConfig, OutputConfig, SiteConfig, UserAgentConfig};
use ctrip_sights::OutputRow;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const INDEX_PATH: &str = "/countrysightlist/china110000";

/// City link nobody listens on; fetching it fails at the transport level
pub const UNREACHABLE_CITY: &str = "http://127.0.0.1:9/sight/b2.html";

/// Creates a test configuration pointing at the mock server
pub fn create_test_config(base_url: &str, out_dir: &Path) -> Config {
    Config {
        site: SiteConfig {
            base_url: base_url.to_string(),
            city_index_path: INDEX_PATH.to_string(),
        },
        crawler: CrawlerConfig {
            request_timeout_secs: 5,
            connect_timeout_secs: 2,
            max_retries: 0,
            retry_delay_ms: 10,
            city_concurrency: 1,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
        },
        output: OutputConfig {
            directory: out_dir.to_string_lossy().to_string(),
            log_path: out_dir.join("crawler.log").to_string_lossy().to_string(),
            spool_path: Some(out_dir.join("spool.db").to_string_lossy().to_string()),
        },
    }
}

/// City index page; each city is `(name, href of its sight overview)`
pub fn index_html(cities: &[(&str, &str)]) -> String {
    let blocks: String = cities
        .iter()
        .map(|(name, href)| {
            format!(
                r#"<dl><dt><a href="/place/{name}.html">{name}</a></dt>
                   <dd>Popular sights</dd>
                   <dd><a href="{href}">All sights</a></dd></dl>"#
            )
        })
        .collect();
    format!(r#"<html><body><div class="list_mod1">{}</div></body></html>"#, blocks)
}

pub fn city_html(categories: &[(&str, u32)]) -> String {
    let anchors: String = categories
        .iter()
        .map(|(label, id)| format!(r#"<a href="javascript:;" onclick="searchType({id});">{label}</a>"#))
        .collect();
    format!(
        r#"<html><body><div class="search_wide"><ul><li><dl><dt>Type</dt><dd>{}</dd></dl></li></ul></div></body></html>"#,
        anchors
    )
}

/// Listing page; each sight is `(name, address, score)`
pub fn listing_html(sights: &[(&str, &str, &str)], page_count: Option<u32>) -> String {
    let blocks: String = sights
        .iter()
        .map(|(name, address, score)| {
            format!(
                r#"<div class="rdetailbox">
                     <dl><dt><a href="/sight/x.html">{name}</a></dt>
                         <dd class="ellipsis">{address}</dd></dl>
                     <ul class="r_comment"><li><a class="score"><strong>{score}</strong></a></li></ul>
                   </div>"#
            )
        })
        .collect();
    let pager = page_count
        .map(|n| format!(r#"<div class="ttd_pager"><b class="numpage">{n}</b></div>"#))
        .unwrap_or_default();
    format!("<html><body>{}{}</body></html>", blocks, pager)
}

pub async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    mount_page_with_status(server, page_path, 200, body).await;
}

pub async fn mount_page_with_status(server: &MockServer, page_path: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Index page 1 lists A and B; A has "Parks" over two pages; B is unreachable
pub async fn mount_scenario(server: &MockServer) {
    mount_page(
        server,
        &format!("{}/p1.html", INDEX_PATH),
        index_html(&[("A", "/sight/a1.html"), ("B", UNREACHABLE_CITY)]),
    )
    .await;
    mount_page(server, "/sight/a1.html", city_html(&[("Parks", 3)])).await;

    let first_page = listing_html(
        &[
            ("West Lake", "1 Lake Rd", "4.7"),
            ("Lingyin \"Temple\"", "2 Hill Rd, North", "4.6"),
            ("Park 3", "3 Rd", "4.1"),
        ],
        Some(2),
    );
    mount_page(server, "/sight/a1/s3.html", first_page.clone()).await;
    mount_page(server, "/sight/a1/s3-p1.html", first_page).await;
    mount_page(
        server,
        "/sight/a1/s3-p2.html",
        listing_html(&[("Park 4", "4 Rd", "3.9"), ("Park 5", "", "")], Some(2)),
    )
    .await;
}

/// Header and rows of a result file
pub fn read_rows(file: &Path) -> (Vec<String>, Vec<OutputRow>) {
    let mut reader = csv::Reader::from_path(file).expect("Failed to open result file");
    let header = reader
        .headers()
        .expect("Failed to read header")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .deserialize()
        .collect::<Result<Vec<OutputRow>, _>>()
        .expect("Failed to parse rows");
    (header, rows)
}
