//! Shared helpers for the integration tests

use catalog_crawler::config::{CrawlConfig, FetcherConfig};
use std::path::Path;
use url::Url;
use wiremock::MockServer;

pub const TEST_AGENT: &str = "book-scraper/0.1 (+tests)";

/// Fetcher tuning that never sleeps
pub fn fast_fetcher_config() -> FetcherConfig {
    FetcherConfig {
        timeout_ms: 2_000,
        jitter_ratio: 0.0,
        max_retries: 3,
        backoff_multiplier_s: 0.0,
        backoff_max_s: 0.0,
    }
}

/// Crawl configuration pointed at a mock server with no delays
pub fn test_config(server: &MockServer, output: &Path) -> CrawlConfig {
    let start = Url::parse(&format!("{}/", server.uri())).unwrap();
    let mut config = CrawlConfig::new(start);
    config.delay_ms = 0;
    config.user_agent = TEST_AGENT.to_string();
    config.fetcher = fast_fetcher_config();
    config.output.path = output.to_path_buf();
    config
}

/// Renders a books-style listing page
pub fn listing_page(items: &[(&str, &str, &str, &str)], next: Option<&str>) -> String {
    let mut html = String::from(
        r#"<html><body>
<ul class="breadcrumb"><li><a href="/">Home</a></li><li class="active">All products</li></ul>
<section>"#,
    );
    for (href, title, price, rating) in items {
        html.push_str(&format!(
            r#"
<article class="product_pod">
  <h3><a href="{href}" title="{title}">{title}</a></h3>
  <p class="star-rating {rating}"></p>
  <div class="product_price">
    <p class="price_color">£{price}</p>
    <p class="instock availability"> In stock </p>
  </div>
</article>"#
        ));
    }
    html.push_str("</section>");
    if let Some(next) = next {
        html.push_str(&format!(
            r#"<ul class="pager"><li class="next"><a href="{next}">next</a></li></ul>"#
        ));
    }
    html.push_str("</body></html>");
    html
}
