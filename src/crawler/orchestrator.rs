//! Crawl orchestration - the three-level walk
//!
//! This module drives the crawl:
//! - Walking the city index pages of the requested range
//! - Fetching each city's category menu
//! - Paging through each category's listing
//! - Folding every level's rows and counters into one report
//!
//! A failed fetch only drops the unit it belongs to (an index page, a city, a
//! category or a listing page). Rows are merged in discovery order even when
//! several cities are crawled at once.

use crate::config::{Config, SiteConfig};
use crate::crawler::extractor::ListingExtractor;
use crate::crawler::fetcher::{fetch_with_retry, HttpFetcher, PageFetcher, RetryPolicy};
use crate::model::{Category, City, OutputRow, PageRange};
use crate::output::CrawlStatistics;
use crate::storage::{RowStore, RunStatus};
use crate::SightError;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Everything a crawl produced
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Flattened rows in crawl order
    pub rows: Vec<OutputRow>,

    /// Counters for every level of the crawl
    pub stats: CrawlStatistics,

    /// Whether the run was cancelled before finishing
    pub cancelled: bool,

    /// Spool run the rows were recorded under, if spooling was on
    pub run_id: Option<i64>,
}

/// Rows and counters produced by one unit of work
#[derive(Debug, Default)]
struct Contribution {
    rows: Vec<OutputRow>,
    stats: CrawlStatistics,
}

impl Contribution {
    fn absorb(&mut self, other: Contribution) {
        self.stats.merge(&other.stats);
        self.rows.extend(other.rows);
    }
}

/// Fetches and extracts one subtree at a time
struct Walker {
    fetcher: Arc<dyn PageFetcher>,
    extractor: ListingExtractor,
    retry: RetryPolicy,
    cancel: CancellationToken,
}

impl Walker {
    /// Collects the cities of every index page in `range`
    async fn discover_cities(
        &self,
        site: &SiteConfig,
        range: PageRange,
    ) -> (Vec<City>, CrawlStatistics) {
        let mut cities = Vec::new();
        let mut stats = CrawlStatistics::default();

        for page in range.pages() {
            if self.cancel.is_cancelled() {
                break;
            }

            let url = site.city_index_url(page);
            match fetch_with_retry(self.fetcher.as_ref(), &url, &self.retry).await {
                Ok(raw) => {
                    let found = self.extractor.extract_cities(&raw.body);
                    info!("Index page {}: {} cities", page, found.len());
                    stats.index_pages_fetched += 1;
                    stats.cities_found += found.len() as u64;
                    cities.extend(found);
                }
                Err(e) => {
                    warn!("Error getting city list at page {}: {}", page, e);
                    stats.index_pages_failed += 1;
                }
            }
        }

        (cities, stats)
    }

    /// Crawls every category of one city
    async fn crawl_city(&self, city: City) -> Contribution {
        let mut contribution = Contribution::default();
        if self.cancel.is_cancelled() {
            return contribution;
        }

        info!("Retrieving category list for {}", city.name);
        let raw = match fetch_with_retry(self.fetcher.as_ref(), &city.index_url, &self.retry).await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Error getting city info for {}: {}", city.name, e);
                contribution.stats.cities_failed += 1;
                return contribution;
            }
        };

        let categories = self
            .extractor
            .extract_categories(&raw.body, &city.index_url);
        contribution.stats.categories_found += categories.len() as u64;

        for category in &categories {
            if self.cancel.is_cancelled() {
                break;
            }
            contribution.absorb(self.crawl_category(&city, category).await);
        }

        info!(
            "Finished {}: {} rows from {} categories",
            city.name,
            contribution.rows.len(),
            categories.len()
        );
        contribution
    }

    /// Pages through one category's listing
    async fn crawl_category(&self, city: &City, category: &Category) -> Contribution {
        let mut contribution = Contribution::default();

        let first = match fetch_with_retry(
            self.fetcher.as_ref(),
            &category.listing_url,
            &self.retry,
        )
        .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    "Error getting category {} of {}: {}",
                    category.label, city.name, e
                );
                contribution.stats.categories_failed += 1;
                return contribution;
            }
        };

        let page_count = self.extractor.extract_detail_page(&first.body).page_count;
        info!(
            "Getting data for {} / {}: {} pages",
            city.name, category.label, page_count
        );

        for page in 1..=page_count {
            if self.cancel.is_cancelled() {
                break;
            }

            debug!("Getting page {} of {}", page, page_count);
            let url = category.page_url(page);
            match fetch_with_retry(self.fetcher.as_ref(), &url, &self.retry).await {
                Ok(raw) => {
                    let detail = self.extractor.extract_detail_page(&raw.body);
                    contribution.stats.detail_pages_fetched += 1;
                    contribution.stats.rows += detail.records.len() as u64;
                    contribution.rows.extend(
                        detail
                            .records
                            .into_iter()
                            .map(|record| OutputRow::join(city, category, record)),
                    );
                }
                Err(e) => {
                    warn!(
                        "Error getting sight info at category {} page {}: {}",
                        category.label, page, e
                    );
                    contribution.stats.detail_pages_failed += 1;
                }
            }
        }

        contribution
    }
}

/// Main crawl orchestrator
pub struct Orchestrator {
    walker: Walker,
    site: SiteConfig,
    concurrency: usize,
    store: Option<Box<dyn RowStore + Send>>,
    config_hash: String,
}

impl Orchestrator {
    /// Creates an orchestrator crawling `site` through `fetcher`
    ///
    /// Defaults: one city at a time, no retries, never cancelled, no spool.
    pub fn new(fetcher: Arc<dyn PageFetcher>, extractor: ListingExtractor, site: SiteConfig) -> Self {
        Self {
            walker: Walker {
                fetcher,
                extractor,
                retry: RetryPolicy::default(),
                cancel: CancellationToken::new(),
            },
            site,
            concurrency: 1,
            store: None,
            config_hash: String::new(),
        }
    }

    /// Creates an HTTP-backed orchestrator from configuration
    pub fn from_config(config: &Config) -> Result<Self, SightError> {
        let fetcher = HttpFetcher::from_config(&config.user_agent, &config.crawler)?;
        let extractor = ListingExtractor::new(&config.site.base_url)?;

        Ok(Self::new(Arc::new(fetcher), extractor, config.site.clone())
            .with_retry_policy(RetryPolicy::from_config(&config.crawler))
            .with_concurrency(config.crawler.city_concurrency))
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.walker.retry = retry;
        self
    }

    /// Number of cities crawled at the same time
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Token checked between units of work
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.walker.cancel = cancel;
        self
    }

    /// Spools rows into `store` as each city finishes
    pub fn with_store(mut self, store: Box<dyn RowStore + Send>, config_hash: String) -> Self {
        self.store = Some(store);
        self.config_hash = config_hash;
        self
    }

    /// Runs the crawl over the city index pages in `range`
    ///
    /// Never fails: every fetch failure is logged and counted in the report.
    pub async fn run(&mut self, range: PageRange) -> CrawlReport {
        info!("Starting crawl of city index pages {}", range);
        let run_id = self.begin_run(range);

        let (cities, mut stats) = self.walker.discover_cities(&self.site, range).await;
        info!("Discovered {} cities", cities.len());

        let walker = &self.walker;
        let mut rows = Vec::new();
        let mut contributions = stream::iter(cities)
            .map(|city| walker.crawl_city(city))
            .buffered(self.concurrency);

        while let Some(contribution) = contributions.next().await {
            if let (Some(store), Some(run_id)) = (self.store.as_mut(), run_id) {
                if let Err(e) = store.append_rows(run_id, &contribution.rows) {
                    warn!("Failed to spool {} rows: {}", contribution.rows.len(), e);
                }
            }
            stats.merge(&contribution.stats);
            rows.extend(contribution.rows);
        }

        let cancelled = self.walker.cancel.is_cancelled();
        if cancelled {
            warn!("Crawl cancelled, keeping {} rows collected so far", rows.len());
        }
        info!(
            "Crawl finished: {} rows, {} failed fetches",
            rows.len(),
            stats.failures()
        );

        CrawlReport {
            rows,
            stats,
            cancelled,
            run_id,
        }
    }

    /// Records the final status of a spooled run
    ///
    /// Does nothing when the run was not spooled.
    pub fn finish_run(&mut self, report: &CrawlReport, status: RunStatus, output_path: Option<&str>) {
        if let (Some(store), Some(run_id)) = (self.store.as_mut(), report.run_id) {
            if let Err(e) = store.finish_run(run_id, status, output_path) {
                warn!("Failed to record status of run {}: {}", run_id, e);
            }
        }
    }

    fn begin_run(&mut self, range: PageRange) -> Option<i64> {
        let store = self.store.as_mut()?;
        match store.begin_run(range, &self.config_hash) {
            Ok(run_id) => {
                info!("Spooling rows as run {}", run_id);
                Some(run_id)
            }
            Err(e) => {
                warn!("Failed to start spool run, continuing without it: {}", e);
                None
            }
        }
    }
}
