//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeouts
//! - GET requests for index and listing pages
//! - Error classification (transport failure or timeout)
//! - The optional retry policy applied on top of any fetcher

use crate::config::{CrawlerConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// A fetched page body
#[derive(Debug, Clone)]
pub struct RawPage {
    /// The URL that was requested
    pub url: String,

    /// Page body content
    pub body: String,
}

/// A failed fetch of one URL
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} timed out")]
    Timeout { url: String },
}

/// Retrieves one page
///
/// Implementations hold no per-call mutable state and may be called
/// concurrently.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<RawPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `crawler` - Timeouts are taken from here
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.user_agent())
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`PageFetcher`] backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client from configuration
    pub fn from_config(
        user_agent: &UserAgentConfig,
        crawler: &CrawlerConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(user_agent, crawler)?))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    /// Fetches a URL
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Any HTTP status | `Ok(RawPage)` (non-2xx is logged) |
    /// | Timeout | `FetchError::Timeout` |
    /// | Connection or body error | `FetchError::Transport` |
    async fn fetch(&self, url: &str) -> Result<RawPage, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        // Error pages are still parsed; they just yield no entries
        let status = response.status();
        if !status.is_success() {
            tracing::warn!("{} answered with HTTP {}", url, status.as_u16());
        }

        let body = response.text().await.map_err(|e| classify(url, e))?;

        Ok(RawPage {
            url: url.to_string(),
            body,
        })
    }
}

fn classify(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}

/// How often a failed fetch is attempted again
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u32,

    /// Pause between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

/// Fetches a URL, retrying per `policy`
///
/// Returns the error of the last attempt once the retries are used up.
pub async fn fetch_with_retry<F>(
    fetcher: &F,
    url: &str,
    policy: &RetryPolicy,
) -> Result<RawPage, FetchError>
where
    F: PageFetcher + ?Sized,
{
    let mut attempt = 0;
    loop {
        match fetcher.fetch(url).await {
            Ok(page) => {
                if attempt > 0 {
                    tracing::debug!("Fetched {} after {} retries", page.url, attempt);
                }
                return Ok(page);
            }
            Err(e) if attempt < policy.max_retries => {
                attempt += 1;
                tracing::debug!(
                    "Fetch of {} failed ({}), retry {}/{}",
                    url,
                    e,
                    attempt,
                    policy.max_retries
                );
                if !policy.delay.is_zero() {
                    tokio::time::sleep(policy.delay).await;
                }
            }
            Err(e) => return Err(e),
        }
    }
}
