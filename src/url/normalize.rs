use crate::UrlError;
use url::Url;

/// Query parameters that never identify a catalog page or item
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "ref", "source"];

/// Canonicalizes a URL for use as a visited-page or item identity key
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an http or https scheme and a host
/// 3. Remove the fragment
/// 4. Remove tracking query parameters (`utm_*` and a few well-known ones)
/// 5. Sort remaining query parameters; drop an empty query string
///
/// Host lowercasing and dot-segment removal are already done by the `url`
/// parser. Unlike a general-purpose normalizer the scheme, `www.` prefix and
/// trailing slash are kept, since catalog sites serve distinct pages on them.
///
/// # Examples
///
/// ```
/// use catalog_crawler::url::canonicalize;
///
/// let url = canonicalize("https://Books.ToScrape.com/catalogue/page-2.html?utm_source=x#top").unwrap();
/// assert_eq!(url.as_str(), "https://books.toscrape.com/catalogue/page-2.html");
/// ```
pub fn canonicalize(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize_url(url)
}

/// Canonicalizes an already-parsed URL
pub fn canonicalize_url(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(url)
}

/// Returns the identity key for a URL
///
/// Falls back to the raw URL text if it cannot be canonicalized.
pub fn page_key(url: &Url) -> String {
    canonicalize_url(url.clone())
        .map(String::from)
        .unwrap_or_else(|_| url.to_string())
}

fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort_by(|a, b| a.0.cmp(&b.0));

    params
}

fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
