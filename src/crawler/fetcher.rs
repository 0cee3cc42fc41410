//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building the HTTP client shared by robots.txt loading and page fetches
//! - Politeness delays before every attempt
//! - Classifying each attempt as success, retryable, or fatal
//! - Bounded retries with randomized exponential backoff

use crate::config::FetcherConfig;
use crate::crawler::backoff::{Politeness, RetryPolicy};
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Maximum redirect hops followed for one request
const MAX_REDIRECTS: usize = 10;

/// A successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// The requested URL
    pub url: String,

    /// HTTP status code of the successful attempt
    pub status: u16,

    /// Page body
    pub body: String,

    /// Attempts used, including the successful one
    pub attempts: u32,
}

/// Typed result of one HTTP attempt
#[derive(Debug)]
pub enum AttemptOutcome {
    /// 2xx with a readable body
    Success { status: u16, body: String },

    /// Rate limited, server error, or network error
    Retry(FetchError),

    /// Client error; never retried
    Fatal(FetchError),
}

/// Record of one HTTP attempt, discarded once the retry loop resolves
#[derive(Debug)]
pub struct FetchAttempt {
    pub url: String,

    /// One-based attempt number
    pub number: u32,

    pub status: Option<u16>,
    pub bytes: usize,
    pub elapsed: Duration,
    pub outcome: AttemptOutcome,
}

impl FetchAttempt {
    fn log(&self) {
        let elapsed_ms = self.elapsed.as_millis() as u64;
        match &self.outcome {
            AttemptOutcome::Success { status, .. } => tracing::info!(
                url = %self.url,
                attempt = self.number,
                status = *status,
                bytes = self.bytes,
                elapsed_ms,
                "Fetched page"
            ),
            AttemptOutcome::Retry(e) => tracing::warn!(
                url = %self.url,
                attempt = self.number,
                status = ?self.status,
                elapsed_ms,
                "Retryable failure: {}",
                e
            ),
            AttemptOutcome::Fatal(e) => tracing::error!(
                url = %self.url,
                attempt = self.number,
                status = ?self.status,
                elapsed_ms,
                "Non-retryable failure: {}",
                e
            ),
        }
    }
}

/// Source of page text for the crawl driver
///
/// [`Fetcher`] is the network implementation; tests substitute canned pages.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches one page, retrying as the implementation sees fit
    async fn fetch(&self, url: &Url) -> FetchResult<FetchedPage>;

    /// Total attempts made so far, failed and interrupted ones included
    fn attempts_made(&self) -> u32;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The User-Agent header sent with every request
/// * `timeout` - Wall-clock timeout for each request
///
/// # Example
///
/// ```no_run
/// use catalog_crawler::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client("book-scraper/0.1", Duration::from_secs(15)).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Politely-delayed, retrying page fetcher
///
/// Owns the run's HTTP client; the connection pool is released when the
/// fetcher is dropped. Clones share the attempt counter.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    politeness: Politeness,
    retry: RetryPolicy,
    attempts: Arc<AtomicU32>,
}

impl Fetcher {
    /// Creates a fetcher with its own client
    pub fn new(
        user_agent: &str,
        base_delay: Duration,
        config: &FetcherConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, config.timeout())?;
        Ok(Self::with_client(client, base_delay, config))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, base_delay: Duration, config: &FetcherConfig) -> Self {
        Self {
            client,
            politeness: Politeness::new(base_delay, config.jitter_ratio),
            retry: RetryPolicy::from_config(config),
            attempts: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn politeness(&self) -> Politeness {
        self.politeness
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Attempts started by this fetcher and its clones
    pub fn total_attempts(&self) -> u32 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Fetches a URL and returns only its body
    pub async fn fetch_text(&self, url: &Url) -> FetchResult<String> {
        self.fetch_page(url).await.map(|page| page.body)
    }

    /// Fetches a URL with politeness delays and retry logic
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 2xx | Return the body |
    /// | HTTP 429 | Retry with backoff |
    /// | HTTP 5xx | Retry with backoff |
    /// | Timeout / connection error | Retry with backoff |
    /// | Other HTTP status | Fail immediately with `ClientError` |
    ///
    /// After `max_retries` failed attempts the last error is wrapped in
    /// `FetchError::RetriesExhausted`.
    pub async fn fetch_page(&self, url: &Url) -> FetchResult<FetchedPage> {
        let mut number = 0;

        loop {
            number += 1;

            let pause = self.politeness.delay();
            if !pause.is_zero() {
                tracing::debug!("Sleeping {:?} before attempt {} for {}", pause, number, url);
                tokio::time::sleep(pause).await;
            }

            self.attempts.fetch_add(1, Ordering::Relaxed);
            let attempt = self.attempt(url, number).await;
            attempt.log();

            match attempt.outcome {
                AttemptOutcome::Success { status, body } => {
                    return Ok(FetchedPage {
                        url: url.to_string(),
                        status,
                        body,
                        attempts: number,
                    });
                }
                AttemptOutcome::Fatal(e) => return Err(e),
                AttemptOutcome::Retry(e) => {
                    if number >= self.retry.max_attempts {
                        return Err(FetchError::RetriesExhausted {
                            url: url.to_string(),
                            attempts: number,
                            last: Box::new(e),
                        });
                    }

                    let wait = self.retry.delay_after(number - 1);
                    tracing::debug!("Backing off {:?} before retrying {}", wait, url);
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// Performs a single GET and classifies the result
    async fn attempt(&self, url: &Url, number: u32) -> FetchAttempt {
        let started = Instant::now();
        let url_str = url.to_string();

        let (status, bytes, outcome) = match self.client.get(url.clone()).send().await {
            Err(e) => (None, 0, AttemptOutcome::Retry(network_error(&url_str, &e))),
            Ok(response) => {
                let status = response.status().as_u16();
                match FetchError::from_status(&url_str, status) {
                    Some(e) if e.is_retryable() => (Some(status), 0, AttemptOutcome::Retry(e)),
                    Some(e) => (Some(status), 0, AttemptOutcome::Fatal(e)),
                    None => match response.text().await {
                        Ok(body) => (
                            Some(status),
                            body.len(),
                            AttemptOutcome::Success { status, body },
                        ),
                        Err(e) => (
                            Some(status),
                            0,
                            AttemptOutcome::Retry(network_error(&url_str, &e)),
                        ),
                    },
                }
            }
        };

        FetchAttempt {
            url: url_str,
            number,
            status,
            bytes,
            elapsed: started.elapsed(),
            outcome,
        }
    }
}

#[async_trait]
impl PageSource for Fetcher {
    async fn fetch(&self, url: &Url) -> FetchResult<FetchedPage> {
        self.fetch_page(url).await
    }

    fn attempts_made(&self) -> u32 {
        self.total_attempts()
    }
}

/// Converts a transport-level reqwest error into a `Network` fetch error
fn network_error(url: &str, error: &reqwest::Error) -> FetchError {
    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection failed".to_string()
    } else {
        error.to_string()
    };

    FetchError::Network {
        url: url.to_string(),
        message,
    }
}
