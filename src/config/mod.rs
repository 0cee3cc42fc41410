//! Configuration module for Catalog-Crawler
//!
//! Run parameters come from the command line; fetcher tuning and the output
//! location may additionally be loaded from an optional TOML file.
//!
//! # Example
//!
//! ```no_run
//! use catalog_crawler::config::load_file_config;
//! use std::path::Path;
//!
//! let file = load_file_config(Path::new("crawler.toml")).unwrap();
//! println!("Max retries: {}", file.fetcher.max_retries);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CrawlConfig, FetcherConfig, FileConfig, OutputConfig, DEFAULT_DELAY_MS, DEFAULT_MAX_PAGES,
    DEFAULT_OUTPUT_PATH, DEFAULT_START_URL, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_file_config, load_file_config_with_hash};
pub use validation::{validate, validate_fetcher_config};
