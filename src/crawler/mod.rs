//! Crawler module for polite, sequential catalog crawling
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with politeness delays and bounded retries
//! - The listing-page state machine that extracts, dedups, and persists records
//! - Wiring a run together from a validated configuration

pub mod backoff;
mod driver;
mod fetcher;

pub use driver::CrawlDriver;
pub use fetcher::{build_http_client, AttemptOutcome, FetchAttempt, FetchedPage, Fetcher, PageSource};

use crate::config::CrawlConfig;
use crate::extract::PageExtractor;
use crate::output::{CrawlSummary, JsonlSink, RecordSink, StopReason};
use crate::robots::{effective_delay, load_policy};
use crate::url::origin_root;
use crate::Result;
use chrono::Utc;
use std::future::Future;

/// Runs a complete crawl, stopping early on Ctrl-C
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client shared by every request
/// 2. Load robots.txt for the start URL's origin
/// 3. Pick the politeness delay (configured vs. robots crawl-delay)
/// 4. Open the output file unless this is a dry run
/// 5. Walk listing pages until a stop condition is hit
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - The run finished; its stop reason says how
/// * `Err(CrawlError)` - The run could not be set up
pub async fn crawl<E: PageExtractor>(config: CrawlConfig, extractor: E) -> Result<CrawlSummary> {
    crawl_until(config, extractor, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Ctrl-C received, initiating graceful shutdown.");
    })
    .await
}

/// Runs a complete crawl, stopping early when `shutdown` resolves
pub async fn crawl_until<E, F>(config: CrawlConfig, extractor: E, shutdown: F) -> Result<CrawlSummary>
where
    E: PageExtractor,
    F: Future<Output = ()>,
{
    let started_at = Utc::now();
    tokio::pin!(shutdown);

    let client = build_http_client(&config.user_agent, config.fetcher.timeout())?;
    let origin = origin_root(&config.start_url)?;

    let policy = tokio::select! {
        policy = load_policy(&client, &origin, &config.user_agent) => policy,
        _ = &mut shutdown => {
            return Ok(interrupted_before_start(&config, started_at));
        }
    };

    let delay = effective_delay(config.delay(), policy.crawl_delay());
    tracing::info!(
        configured_ms = config.delay_ms,
        robots_ms = policy.crawl_delay_ms(),
        effective_ms = delay.as_millis() as u64,
        "Politeness delay chosen"
    );

    let fetcher = Fetcher::with_client(client, delay, &config.fetcher);

    let sink: Option<Box<dyn RecordSink>> = if config.dry_run {
        tracing::info!("Dry run: records will not be written");
        None
    } else {
        let sink = JsonlSink::open(&config.output.path)?;
        tracing::info!("Appending records to {}", sink.path().display());
        Some(Box::new(sink))
    };

    let driver = CrawlDriver::new(config, fetcher, extractor, policy, sink)?;
    Ok(driver.run_until(shutdown).await)
}

/// Summary for a run interrupted while robots.txt was still loading
fn interrupted_before_start(config: &CrawlConfig, started_at: chrono::DateTime<Utc>) -> CrawlSummary {
    let summary = CrawlSummary {
        pages_crawled: 0,
        unique_items: 0,
        items_written: 0,
        fetch_attempts: 0,
        output: None,
        dry_run: config.dry_run,
        started_at,
        finished_at: Utc::now(),
        stop_reason: StopReason::Interrupted,
    };
    summary.log();
    summary
}
