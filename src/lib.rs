//! Catalog-Crawler: a polite paginated catalog crawler
//!
//! This crate walks the listing pages of a catalog website one page at a time,
//! respecting robots.txt and politeness delays, retrying transient failures with
//! backoff, and appending deduplicated product records to a JSON Lines file.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod robots;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Catalog-Crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        from: state::CrawlState,
        to: state::CrawlState,
    },
}

/// Classification of a failed fetch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    /// HTTP 429
    RateLimited,
    /// HTTP 5xx
    ServerError,
    /// HTTP 4xx other than 429, or any other non-success status
    ClientError,
    /// Timeout, connection failure, or a body that could not be read
    NetworkError,
}

impl FetchErrorKind {
    /// Returns true if an attempt failing with this kind may be retried
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::ClientError)
    }
}

/// Fetch-specific errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Rate limited (HTTP 429) for {url}")]
    RateLimited { url: String },

    #[error("Server error (HTTP {status}) for {url}")]
    ServerError { url: String, status: u16 },

    #[error("Client error (HTTP {status}) for {url}")]
    ClientError { url: String, status: u16 },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Retries exhausted for {url} after {attempts} attempts (last error: {last})")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Returns the kind of the underlying failure
    ///
    /// For `RetriesExhausted` this is the kind of the last attempt.
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::RateLimited { .. } => FetchErrorKind::RateLimited,
            Self::ServerError { .. } => FetchErrorKind::ServerError,
            Self::ClientError { .. } => FetchErrorKind::ClientError,
            Self::Network { .. } => FetchErrorKind::NetworkError,
            Self::RetriesExhausted { last, .. } => last.kind(),
        }
    }

    /// Returns true if this single-attempt error may be retried
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RetriesExhausted { .. } => false,
            other => other.kind().is_retryable(),
        }
    }

    /// Returns true if the retry budget was consumed
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::RetriesExhausted { .. })
    }

    /// Returns the URL the failed request targeted
    pub fn url(&self) -> &str {
        match self {
            Self::RateLimited { url }
            | Self::ServerError { url, .. }
            | Self::ClientError { url, .. }
            | Self::Network { url, .. }
            | Self::RetriesExhausted { url, .. } => url,
        }
    }

    /// Classifies a non-success HTTP status
    ///
    /// Returns `None` for 2xx statuses.
    pub fn from_status(url: &str, status: u16) -> Option<Self> {
        let url = url.to_string();
        match status {
            200..=299 => None,
            429 => Some(Self::RateLimited { url }),
            500..=599 => Some(Self::ServerError { url, status }),
            _ => Some(Self::ClientError { url, status }),
        }
    }
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
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Catalog-Crawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::CrawlConfig;
pub use crawler::{crawl, crawl_until, CrawlDriver, Fetcher, PageSource};
pub use extract::{BooksExtractor, Listing, PageExtractor, Record};
pub use output::{CrawlSummary, StopReason};
pub use state::CrawlState;
