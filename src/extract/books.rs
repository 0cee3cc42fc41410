//! Extractor for books.toscrape.com style catalog pages
//!
//! Listing pages carry `article.product_pod` summaries, a breadcrumb naming the
//! category, and a `li.next` pager link. Detail pages carry a
//! `div.product_main` block.

use crate::extract::text::{clean_ws, parse_price, rating_from_classes};
use crate::extract::{Listing, PageExtractor, Record};
use crate::url::{page_key, resolve_link, same_origin};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Origin tag written into every record
pub const BOOKS_SITE: &str = "books";

/// Breadcrumb text used by the unfiltered catalog
const ALL_PRODUCTS: &str = "all products";

/// Extractor for the books catalog markup
#[derive(Debug, Clone, Copy, Default)]
pub struct BooksExtractor;

impl BooksExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl PageExtractor for BooksExtractor {
    fn extract_listing(&self, page: &str, base_url: &Url, page_url: &Url) -> Listing {
        let document = Html::parse_document(page);

        let category = select_text(document.root_element(), "ul.breadcrumb li.active")
            .filter(|text| !text.eq_ignore_ascii_case(ALL_PRODUCTS))
            .unwrap_or_default();

        let mut records = Vec::new();
        if let Ok(pod_selector) = Selector::parse("article.product_pod") {
            for pod in document.select(&pod_selector) {
                if let Some(record) = extract_pod(pod, base_url, page_url, &category) {
                    records.push(record);
                }
            }
        }

        let next_url = select_first(document.root_element(), "li.next a")
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| resolve_link(href, page_url));

        Listing { records, next_url }
    }

    fn extract_detail(&self, page: &str, page_url: &Url) -> Record {
        let document = Html::parse_document(page);
        let root = document.root_element();

        let title = select_text(root, "div.product_main h1").unwrap_or_default();

        let price = select_text(root, "div.product_main p.price_color")
            .map(|text| parse_price(&text))
            .unwrap_or(0.0);

        let availability =
            select_text(root, "div.product_main p.instock.availability").unwrap_or_default();

        let rating = select_first(root, "div.product_main p.star-rating")
            .map(|el| rating_from_classes(el.value().classes()))
            .unwrap_or(0);

        // Home > Books > <category> > <title>
        let category = Selector::parse("ul.breadcrumb li")
            .ok()
            .and_then(|sel| document.select(&sel).nth(2))
            .map(|li| clean_ws(&li.text().collect::<Vec<_>>().join(" ")))
            .unwrap_or_default();

        let key = page_key(page_url);
        Record {
            key: key.clone(),
            site: BOOKS_SITE.to_string(),
            url: key,
            title,
            price,
            availability,
            rating,
            category,
        }
    }
}

/// Builds a record from one `article.product_pod`
///
/// Returns None when the pod has no usable link, or the link leaves the site.
fn extract_pod(pod: ElementRef<'_>, base_url: &Url, page_url: &Url, category: &str) -> Option<Record> {
    let link = select_first(pod, "h3 a")?;
    let href = link.value().attr("href")?;

    // Relative hrefs are relative to the listing page, not the site root
    let url = resolve_link(href, page_url)?;
    if !same_origin(&url, base_url) {
        tracing::debug!("Skipping off-site item link {}", url);
        return None;
    }

    let title = link
        .value()
        .attr("title")
        .map(clean_ws)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| clean_ws(&link.text().collect::<Vec<_>>().join(" ")));

    let price = select_text(pod, "p.price_color")
        .map(|text| parse_price(&text))
        .unwrap_or(0.0);

    let availability = select_text(pod, "p.instock.availability").unwrap_or_default();

    let rating = select_first(pod, "p.star-rating")
        .map(|el| rating_from_classes(el.value().classes()))
        .unwrap_or(0);

    let key = page_key(&url);
    Some(Record {
        key: key.clone(),
        site: BOOKS_SITE.to_string(),
        url: key,
        title,
        price,
        availability,
        rating,
        category: category.to_string(),
    })
}

fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    scope.select(&selector).next()
}

/// Whitespace-collapsed text of the first match
fn select_text(scope: ElementRef<'_>, css: &str) -> Option<String> {
    select_first(scope, css).map(|el| clean_ws(&el.text().collect::<Vec<_>>().join(" ")))
}
