//! Script-Census: which script libraries do the top search results load?
//!
//! This crate fetches a search-engine results page, follows every result
//! link, extracts the `<script src>` references from each page and ranks
//! the most frequently referenced libraries.

pub mod config;
pub mod crawler;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Script-Census operations
#[derive(Debug, Error)]
pub enum CensusError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Worker pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("Task in stage '{stage}' failed: {message}")]
    TaskFailed { stage: &'static str, message: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector in config: {0}")]
    InvalidSelector(String),
}

/// Cause classification of a failed download
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    /// The URL could not be parsed
    MalformedUrl,
    /// The server answered with a non-success status code
    Status,
    /// Connection, read or timeout failure
    Io,
}

/// Errors raised while downloading a single page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Detected malformed url: {url}: {source}")]
    MalformedUrl {
        url: String,
        source: ::url::ParseError,
    },

    #[error("Wrong status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Unable to GET {url}: {source}")]
    Transport { url: String, source: reqwest::Error },
}

impl FetchError {
    /// Returns the cause classification of this error
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::MalformedUrl { .. } => FetchErrorKind::MalformedUrl,
            Self::Status { .. } => FetchErrorKind::Status,
            Self::Timeout { .. } | Self::Transport { .. } => FetchErrorKind::Io,
        }
    }

    /// Returns the URL the failed request was made for
    pub fn url(&self) -> &str {
        match self {
            Self::MalformedUrl { url, .. }
            | Self::Status { url, .. }
            | Self::Timeout { url }
            | Self::Transport { url, .. } => url,
        }
    }
}

/// Errors raised by link extractors
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Page location '{url}' is not a valid base URL: {source}")]
    InvalidBaseUrl {
        url: String,
        source: ::url::ParseError,
    },
}

/// Worker pool errors
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Pool '{pool}' is shut down and rejects new work")]
    Shutdown { pool: &'static str },

    #[error("Failed to start pool '{pool}': {source}")]
    Build {
        pool: &'static str,
        source: std::io::Error,
    },
}

/// Result type alias for Script-Census operations
pub type Result<T> = std::result::Result<T, CensusError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{
    rank, AggregateCount, CrawlPipeline, FetchedPage, HttpFetcher, RankedEntry, ResourcePage,
    ScriptExtractor, SearchResultExtractor,
};
