//! Robots.txt handling module
//!
//! This module fetches and parses robots.txt once per run and answers
//! permission and crawl-delay questions from the resulting snapshot.

mod parser;
mod snapshot;

pub use parser::{product_token, ParsedRobots};
pub use snapshot::PolicySnapshot;

use crate::url::robots_url;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Loads the robots.txt policy for a URL's origin
///
/// This never fails: a network error, a non-success status, or an unreadable
/// body all degrade to an allow-all snapshot with no crawl delay.
///
/// # Arguments
///
/// * `client` - The HTTP client shared with the page fetcher
/// * `origin` - Any URL on the origin to load robots.txt for
/// * `user_agent` - The full User-Agent string; its product token is used
///   for rule evaluation
pub async fn load_policy(client: &Client, origin: &Url, user_agent: &str) -> PolicySnapshot {
    let agent = robots_token(user_agent);

    let robots_location = match robots_url(origin) {
        Ok(u) => u,
        Err(e) => {
            tracing::warn!("Cannot locate robots.txt for {}: {}. Defaulting to allow all.", origin, e);
            return PolicySnapshot::allow_all(agent);
        }
    };

    let response = match client.get(robots_location.clone()).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(
                "Failed to load robots.txt from {} ({}). Defaulting to allow all.",
                robots_location,
                e
            );
            return PolicySnapshot::allow_all(agent);
        }
    };

    let status = response.status();
    if !status.is_success() {
        tracing::info!(
            "No robots.txt at {} (HTTP {}). Defaulting to allow all.",
            robots_location,
            status.as_u16()
        );
        return PolicySnapshot::allow_all(agent);
    }

    match response.text().await {
        Ok(body) => {
            tracing::info!("Loaded robots.txt from {}", robots_location);
            let snapshot = PolicySnapshot::new(ParsedRobots::from_content(&body), agent);
            if let Some(delay) = snapshot.crawl_delay() {
                tracing::info!("Crawl-delay found in robots.txt: {} ms", delay.as_millis());
            }
            snapshot
        }
        Err(e) => {
            tracing::warn!(
                "Failed to read robots.txt from {} ({}). Defaulting to allow all.",
                robots_location,
                e
            );
            PolicySnapshot::allow_all(agent)
        }
    }
}

/// Derives the robots.txt product token from a User-Agent string
///
/// The token is the leading run of `[A-Za-z_-]` characters, lowercased, which
/// is exactly how robots.txt `User-agent` lines are read. Digits end the
/// token, so `bot2/1.0` is evaluated as `bot`. Falls back to `*`.
///
/// # Examples
///
/// ```
/// use catalog_crawler::robots::robots_token;
///
/// assert_eq!(robots_token("book-scraper/0.1 (+yourname)"), "book-scraper");
/// ```
pub fn robots_token(user_agent: &str) -> String {
    product_token(user_agent).unwrap_or_else(|| "*".to_string())
}

/// Chooses the politeness delay for a run
///
/// Returns the larger of the configured delay and the robots.txt crawl-delay;
/// an absent crawl-delay counts as zero.
pub fn effective_delay(configured: Duration, robots_delay: Option<Duration>) -> Duration {
    configured.max(robots_delay.unwrap_or(Duration::ZERO))
}
