//! ctrip-sights: a three-level sight crawler for you.ctrip.com
//!
//! This crate walks city index pages, each city's sight categories and each
//! category's paginated listing, and flattens the result into one CSV table.

pub mod config;
pub mod crawler;
pub mod logging;
pub mod model;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for ctrip-sights operations
#[derive(Debug, Error)]
pub enum SightError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Write error: {0}")]
    Write(#[from] output::WriteError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid selector {selector}: {message}")]
    Selector { selector: String, message: String },

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to render TOML: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for ctrip-sights operations
pub type Result<T> = std::result::Result<T, SightError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{Category, City, DetailRecord, OutputRow, PageRange};
