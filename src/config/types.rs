use serde::{Deserialize, Serialize};

/// Main configuration structure for ctrip-sights
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Where the crawl starts
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Origin that relative city links are resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the paginated city index, without the `/pN.html` suffix
    #[serde(rename = "city-index-path")]
    pub city_index_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://you.ctrip.com".to_string(),
            city_index_path: "/countrysightlist/china110000".to_string(),
        }
    }
}

impl SiteConfig {
    /// URL of the given city index page
    pub fn city_index_url(&self, page: u32) -> String {
        format!(
            "{}{}/p{}.html",
            self.base_url.trim_end_matches('/'),
            self.city_index_path,
            page
        )
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Whole-request timeout in seconds
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Extra attempts for a failed fetch before the unit is skipped
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Delay between attempts (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// Number of cities crawled at the same time
    #[serde(rename = "city-concurrency")]
    pub city_concurrency: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            max_retries: 0,
            retry_delay_ms: 1000,
            city_concurrency: 1,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "ctrip-sights".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl UserAgentConfig {
    pub fn user_agent(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the result CSV is written to
    pub directory: String,

    /// Path of the log file
    #[serde(rename = "log-path")]
    pub log_path: String,

    /// Path of the SQLite row spool; `None` or empty disables it
    #[serde(rename = "spool-path", skip_serializing_if = "Option::is_none")]
    pub spool_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            log_path: "crawler.log".to_string(),
            spool_path: Some("crawl_spool.db".to_string()),
        }
    }
}

impl OutputConfig {
    /// The spool path, if spooling is enabled
    pub fn spool(&self) -> Option<&str> {
        self.spool_path.as_deref().filter(|p| !p.is_empty())
    }
}
