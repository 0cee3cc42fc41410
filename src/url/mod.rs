//! URL handling module for Catalog-Crawler
//!
//! This module provides identity-key canonicalization, origin helpers used to
//! locate robots.txt, and href resolution for extracted links.

mod normalize;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use normalize::{canonicalize, canonicalize_url, page_key};

/// Returns `<scheme>://<host>[:port]/` for a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use catalog_crawler::url::origin_root;
///
/// let url = Url::parse("https://books.toscrape.com/catalogue/page-2.html?x=1").unwrap();
/// assert_eq!(origin_root(&url).unwrap().as_str(), "https://books.toscrape.com/");
/// ```
pub fn origin_root(url: &Url) -> UrlResult<Url> {
    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    let mut root = url.clone();
    root.set_path("/");
    root.set_query(None);
    root.set_fragment(None);
    Ok(root)
}

/// Returns the robots.txt location for a URL's origin
pub fn robots_url(url: &Url) -> UrlResult<Url> {
    origin_root(url)?
        .join("/robots.txt")
        .map_err(|e| UrlError::Parse(e.to_string()))
}

/// Returns true if both URLs share scheme, host, and port
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}

/// Resolves an href against a base URL
///
/// Returns None if the link should be excluded:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    canonicalize_url(absolute_url).ok()
}
