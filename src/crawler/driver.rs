//! Crawl driver - the sequential listing-page state machine
//!
//! One page is in flight at a time. Each iteration moves through
//! Fetching → Extracting → Deduping → Persisting → Deciding, and the run ends
//! in Done (natural stop) or Aborted (policy stop, fatal error, interrupt).

use crate::config::CrawlConfig;
use crate::crawler::fetcher::PageSource;
use crate::extract::{PageExtractor, Record};
use crate::output::{CrawlSummary, RecordSink, StopReason};
use crate::robots::PolicySnapshot;
use crate::state::CrawlState;
use crate::url::{origin_root, page_key, same_origin};
use crate::{CrawlError, Result};
use chrono::Utc;
use std::collections::HashSet;
use std::future::Future;
use url::Url;

/// Drives one crawl run from the start URL to a stop reason
pub struct CrawlDriver<S, E> {
    config: CrawlConfig,
    source: S,
    extractor: E,
    policy: PolicySnapshot,

    /// None in dry-run mode
    sink: Option<Box<dyn RecordSink>>,

    base_url: Url,
    state: CrawlState,

    /// Page keys of listing pages already fetched this run
    visited: HashSet<String>,

    /// Record keys already emitted this run
    seen_keys: HashSet<String>,

    pages_crawled: u32,
    items_written: usize,
}

impl<S: PageSource, E: PageExtractor> CrawlDriver<S, E> {
    /// Creates a driver in the `Idle` state
    ///
    /// # Arguments
    ///
    /// * `config` - Run parameters
    /// * `source` - Where page text comes from
    /// * `extractor` - Turns page text into records
    /// * `policy` - robots.txt snapshot for the start URL's origin
    /// * `sink` - Record destination; pass None for a dry run
    pub fn new(
        config: CrawlConfig,
        source: S,
        extractor: E,
        policy: PolicySnapshot,
        sink: Option<Box<dyn RecordSink>>,
    ) -> Result<Self> {
        let base_url = origin_root(&config.start_url)?;

        Ok(Self {
            config,
            source,
            extractor,
            policy,
            sink,
            base_url,
            state: CrawlState::Idle,
            visited: HashSet::new(),
            seen_keys: HashSet::new(),
            pages_crawled: 0,
            items_written: 0,
        })
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Runs until the crawl stops on its own
    pub async fn run(self) -> CrawlSummary {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Runs until the crawl stops or `shutdown` resolves
    ///
    /// Batches are written synchronously between awaits, so every batch
    /// written before the interrupt is complete on disk.
    pub async fn run_until<F>(mut self, shutdown: F) -> CrawlSummary
    where
        F: Future<Output = ()>,
    {
        let started_at = Utc::now();
        tracing::info!(
            start = %self.config.start_url,
            max_pages = self.config.max_pages,
            dry_run = self.config.dry_run,
            "Starting crawl"
        );

        let stop_reason = tokio::select! {
            reason = self.crawl_loop() => reason,
            _ = shutdown => {
                tracing::info!("Shutdown requested, stopping crawl");
                StopReason::Interrupted
            }
        };

        self.finish(started_at, stop_reason)
    }

    async fn crawl_loop(&mut self) -> StopReason {
        match self.step_loop().await {
            Ok(reason) => reason,
            Err(e) => StopReason::Fatal(e),
        }
    }

    async fn step_loop(&mut self) -> Result<StopReason> {
        let mut url = self.config.start_url.clone();
        self.transition(CrawlState::Fetching)?;

        loop {
            // Fetching
            let key = page_key(&url);
            if self.visited.contains(&key) {
                tracing::warn!(url = %url, "Next page was already visited, stopping");
                return Ok(StopReason::AlreadyVisited(url));
            }
            if !self.policy.is_allowed(&url) {
                return Ok(StopReason::RobotsDisallowed(url));
            }
            self.visited.insert(key);

            let page = self.source.fetch(&url).await?;
            tracing::debug!(url = %url, attempts = page.attempts, "Page fetched");

            // Extracting
            self.transition(CrawlState::Extracting)?;
            let listing = self
                .extractor
                .extract_listing(&page.body, &self.base_url, &url);

            // Deduping
            self.transition(CrawlState::Deduping)?;
            let extracted = listing.records.len();
            let fresh = self.dedup(listing.records);
            tracing::info!(
                url = %url,
                extracted,
                new = fresh.len(),
                "Extracted records"
            );

            // Persisting
            if let Some(sink) = self.sink.as_mut() {
                self.state = next_state(self.state, CrawlState::Persisting)?;
                let written = sink.write_batch(&fresh)?;
                self.items_written += written;
                tracing::debug!("Wrote {} records", written);
            } else {
                for record in &fresh {
                    tracing::debug!(key = %record.key, title = %record.title, "Dry run record");
                }
            }
            // Keys count as seen only once their batch is on disk
            self.seen_keys.extend(fresh.into_iter().map(|record| record.key));
            self.pages_crawled += 1;

            // Deciding
            self.transition(CrawlState::Deciding)?;
            match listing.next_url {
                None => {
                    self.transition(CrawlState::Done)?;
                    return Ok(StopReason::NoNextPage);
                }
                Some(next) if !same_origin(&next, &self.base_url) => {
                    tracing::warn!(
                        url = %next,
                        origin = %self.base_url,
                        "Next page leaves the crawled site, stopping"
                    );
                    self.transition(CrawlState::Done)?;
                    return Ok(StopReason::NoNextPage);
                }
                Some(_) if self.pages_crawled >= self.config.max_pages => {
                    self.transition(CrawlState::Done)?;
                    return Ok(StopReason::MaxPagesReached);
                }
                Some(next) => {
                    self.transition(CrawlState::Fetching)?;
                    url = next;
                }
            }
        }
    }

    /// Keeps only records whose key has not been seen this run
    ///
    /// Duplicates within the batch are dropped too. `seen_keys` is not
    /// updated here.
    fn dedup(&self, records: Vec<Record>) -> Vec<Record> {
        let mut batch_keys = HashSet::new();
        records
            .into_iter()
            .filter(|record| {
                !self.seen_keys.contains(&record.key) && batch_keys.insert(record.key.clone())
            })
            .collect()
    }

    fn transition(&mut self, next: CrawlState) -> Result<()> {
        self.state = next_state(self.state, next)?;
        Ok(())
    }

    fn finish(mut self, started_at: chrono::DateTime<Utc>, stop_reason: StopReason) -> CrawlSummary {
        if !self.state.is_terminal() {
            self.state = CrawlState::Aborted;
        }
        tracing::debug!("Crawl driver reached state {}", self.state);

        let summary = CrawlSummary {
            pages_crawled: self.pages_crawled,
            unique_items: self.seen_keys.len(),
            items_written: self.items_written,
            fetch_attempts: self.source.attempts_made(),
            output: self
                .sink
                .as_ref()
                .and_then(|sink| sink.location())
                .map(|p| p.to_path_buf()),
            dry_run: self.config.dry_run,
            started_at,
            finished_at: Utc::now(),
            stop_reason,
        };
        summary.log();
        summary
    }
}

/// Validates a state change, returning the new state
fn next_state(from: CrawlState, to: CrawlState) -> Result<CrawlState> {
    if from.can_transition_to(to) {
        tracing::trace!("State {} -> {}", from, to);
        Ok(to)
    } else {
        Err(CrawlError::InvalidTransition { from, to })
    }
}
