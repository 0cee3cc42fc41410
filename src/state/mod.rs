//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: the phase the crawl driver is in (fetching, extracting, deduping, ...)

mod crawl_state;

pub use crawl_state::CrawlState;
