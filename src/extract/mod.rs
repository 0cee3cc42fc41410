//! Page extraction module
//!
//! Extractors turn the text of one fetched page into product records and an
//! optional link to the next listing page. The crawl driver only depends on the
//! [`PageExtractor`] trait, so site-specific selector logic can be swapped
//! without touching the fetch/retry/dedup loop.

mod books;
mod text;

pub use books::BooksExtractor;
pub use text::{clean_ws, parse_price, rating_from_classes};

use serde::{Deserialize, Serialize};
use url::Url;

/// One extracted product
///
/// Serialized field-for-field as one line of the JSON Lines output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Identity key (the canonical item URL)
    pub key: String,

    /// Origin tag of the site the record came from
    pub site: String,

    /// Canonical item URL
    pub url: String,

    pub title: String,

    /// Non-negative price, 0.0 when unknown
    pub price: f64,

    pub availability: String,

    /// Star rating 1..=5, 0 when unknown
    pub rating: u8,

    /// Category name, empty when the page has none
    pub category: String,
}

/// Records and pagination pointer extracted from one listing page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    pub records: Vec<Record>,

    /// Absolute URL of the next listing page, None on the last page
    pub next_url: Option<Url>,
}

/// Maps raw page text to records
///
/// Implementations are pure: no I/O, no shared state. Missing or malformed
/// optional fields degrade to defaults (price 0.0, rating 0, empty strings)
/// instead of failing.
pub trait PageExtractor {
    /// Extracts item summaries and the next-page link from a listing page
    ///
    /// # Arguments
    ///
    /// * `page` - The page text
    /// * `base_url` - Root of the site being crawled; items off this origin are dropped
    /// * `page_url` - URL the page was fetched from, used to resolve relative links
    fn extract_listing(&self, page: &str, base_url: &Url, page_url: &Url) -> Listing;

    /// Extracts the single item described by a detail page
    fn extract_detail(&self, page: &str, page_url: &Url) -> Record;
}
