use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default first listing page
pub const DEFAULT_START_URL: &str = "https://books.toscrape.com/";

/// Default cap on listing pages visited
pub const DEFAULT_MAX_PAGES: u32 = 5;

/// Default politeness delay in milliseconds
pub const DEFAULT_DELAY_MS: u64 = 800;

/// Default User-Agent header
pub const DEFAULT_USER_AGENT: &str = "book-scraper/0.1 (+yourname)";

/// Default JSON Lines output file
pub const DEFAULT_OUTPUT_PATH: &str = "data/items.jsonl";

/// Immutable parameters for one crawl run
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// First listing page
    pub start_url: Url,

    /// Hard cap on listing pages visited
    pub max_pages: u32,

    /// Minimum politeness delay before each request (milliseconds)
    pub delay_ms: u64,

    /// User-Agent header, also used for robots.txt evaluation
    pub user_agent: String,

    /// Run the full crawl but skip persistence
    pub dry_run: bool,

    pub fetcher: FetcherConfig,
    pub output: OutputConfig,
}

impl CrawlConfig {
    /// Creates a configuration with defaults for everything but the start URL
    pub fn new(start_url: Url) -> Self {
        Self {
            start_url,
            max_pages: DEFAULT_MAX_PAGES,
            delay_ms: DEFAULT_DELAY_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            dry_run: false,
            fetcher: FetcherConfig::default(),
            output: OutputConfig::default(),
        }
    }

    /// The configured politeness delay as a Duration
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Optional on-disk configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub fetcher: FetcherConfig,
    pub output: OutputConfig,
}

/// HTTP fetch, politeness, and retry tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetcherConfig {
    /// Wall-clock timeout per attempt (milliseconds)
    pub timeout_ms: u64,

    /// Politeness jitter: each delay is scaled by uniform(1 - j, 1 + j)
    pub jitter_ratio: f64,

    /// Total attempts per URL, including the first
    pub max_retries: u32,

    /// Exponential backoff multiplier (seconds)
    pub backoff_multiplier_s: f64,

    /// Cap on any single backoff wait (seconds)
    pub backoff_max_s: f64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            jitter_ratio: 0.20,
            max_retries: 3,
            backoff_multiplier_s: 0.5,
            backoff_max_s: 5.0,
        }
    }
}

impl FetcherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the JSON Lines file records are appended to
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}
