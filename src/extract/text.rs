//! Text cleanup helpers shared by extractors

use regex::Regex;
use std::sync::LazyLock;

static RE_PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+(?:\.[0-9]+)?)").expect("price pattern is valid"));

static RE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Star-rating class names and their values
const RATING_CLASSES: &[(&str, u8)] = &[
    ("One", 1),
    ("Two", 2),
    ("Three", 3),
    ("Four", 4),
    ("Five", 5),
];

/// Collapses runs of whitespace to a single space and trims the ends
pub fn clean_ws(text: &str) -> String {
    RE_WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Parses the first decimal number in a price string
///
/// Thousands separators are ignored. Returns 0.0 when no number is present.
///
/// # Examples
///
/// ```
/// use catalog_crawler::extract::parse_price;
///
/// assert_eq!(parse_price("£51.77"), 51.77);
/// assert_eq!(parse_price("£1,234.50"), 1234.5);
/// assert_eq!(parse_price("free"), 0.0);
/// ```
pub fn parse_price(text: &str) -> f64 {
    let without_commas = text.replace(',', "");
    RE_PRICE
        .captures(&without_commas)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Maps star-rating CSS classes (`star-rating Three`) to 1..=5, 0 if unknown
pub fn rating_from_classes<'a>(classes: impl IntoIterator<Item = &'a str>) -> u8 {
    let classes: Vec<&str> = classes.into_iter().collect();
    RATING_CLASSES
        .iter()
        .find(|(name, _)| classes.contains(name))
        .map_or(0, |(_, value)| *value)
}
