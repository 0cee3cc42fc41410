//! Crawl summary and stop reasons

use crate::CrawlError;
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Exit code for a run that ended normally
pub const EXIT_OK: u8 = 0;

/// Exit code for a run that hit a fatal error
pub const EXIT_FATAL: u8 = 1;

/// Exit code for a run interrupted by the user
pub const EXIT_INTERRUPTED: u8 = 130;

/// Why the crawl loop stopped
#[derive(Debug)]
pub enum StopReason {
    /// The last page had no next link
    NoNextPage,

    /// `max_pages` listing pages were processed
    MaxPagesReached,

    /// The next URL had already been fetched in this run
    AlreadyVisited(Url),

    /// robots.txt disallowed the next URL
    RobotsDisallowed(Url),

    /// Shutdown was requested
    Interrupted,

    /// A non-retryable error, exhausted retries, or an output failure
    Fatal(CrawlError),
}

impl StopReason {
    /// Process exit code for this outcome
    ///
    /// Policy stops (robots, loop guard) count as a normal finish.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::NoNextPage
            | Self::MaxPagesReached
            | Self::AlreadyVisited(_)
            | Self::RobotsDisallowed(_) => EXIT_OK,
            Self::Interrupted => EXIT_INTERRUPTED,
            Self::Fatal(_) => EXIT_FATAL,
        }
    }

    /// True when the run ended without reaching a natural stopping point
    pub fn is_abort(&self) -> bool {
        !matches!(self, Self::NoNextPage | Self::MaxPagesReached)
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoNextPage => write!(f, "no next page"),
            Self::MaxPagesReached => write!(f, "max pages reached"),
            Self::AlreadyVisited(url) => write!(f, "already visited {}", url),
            Self::RobotsDisallowed(url) => write!(f, "disallowed by robots.txt: {}", url),
            Self::Interrupted => write!(f, "interrupted"),
            Self::Fatal(e) => write!(f, "fatal error: {}", e),
        }
    }
}

/// Final counters for one run
#[derive(Debug)]
pub struct CrawlSummary {
    /// Listing pages fully processed
    pub pages_crawled: u32,

    /// Distinct record keys seen this run
    pub unique_items: usize,

    /// Records appended to the output file (0 in dry-run mode)
    pub items_written: usize,

    /// HTTP attempts made for listing pages, retries included
    pub fetch_attempts: u32,

    pub output: Option<PathBuf>,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub stop_reason: StopReason,
}

impl CrawlSummary {
    pub fn exit_code(&self) -> u8 {
        self.stop_reason.exit_code()
    }

    /// Wall-clock duration of the run
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Emits the summary as one structured log event
    pub fn log(&self) {
        let output = self
            .output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".to_string());
        let elapsed_ms = self.elapsed().num_milliseconds();

        match &self.stop_reason {
            StopReason::Fatal(_) => tracing::error!(
                pages_crawled = self.pages_crawled,
                unique_items = self.unique_items,
                items_written = self.items_written,
                fetch_attempts = self.fetch_attempts,
                output = %output,
                dry_run = self.dry_run,
                elapsed_ms,
                "Crawl aborted: {}",
                self.stop_reason
            ),
            reason if reason.is_abort() => tracing::warn!(
                pages_crawled = self.pages_crawled,
                unique_items = self.unique_items,
                items_written = self.items_written,
                fetch_attempts = self.fetch_attempts,
                output = %output,
                dry_run = self.dry_run,
                elapsed_ms,
                "Crawl stopped: {}",
                reason
            ),
            reason => tracing::info!(
                pages_crawled = self.pages_crawled,
                unique_items = self.unique_items,
                items_written = self.items_written,
                fetch_attempts = self.fetch_attempts,
                output = %output,
                dry_run = self.dry_run,
                elapsed_ms,
                "Crawl complete: {}",
                reason
            ),
        }
    }
}

/// Prints a human-readable summary to stdout
pub fn print_summary(summary: &CrawlSummary) {
    println!("\n=== Crawl Summary ===\n");
    println!("Stop reason:     {}", summary.stop_reason);
    println!("Pages crawled:   {}", summary.pages_crawled);
    println!("Fetch attempts:  {}", summary.fetch_attempts);
    println!("Unique items:    {}", summary.unique_items);

    if summary.dry_run {
        println!("Items written:   0 (dry run)");
    } else {
        println!("Items written:   {}", summary.items_written);
    }

    match &summary.output {
        Some(path) => println!("Output:          {}", path.display()),
        None => println!("Output:          none"),
    }

    println!(
        "Started:         {}",
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "Duration:        {:.1}s",
        summary.elapsed().num_milliseconds() as f64 / 1000.0
    );
    println!();
}
