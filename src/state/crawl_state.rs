/// Crawl driver state definitions
///
/// This module defines the phases a crawl run moves through and which
/// transitions between them are legal.
use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    // ===== Active States =====
    /// Run has been set up but no page has been requested
    Idle,

    /// A page is being requested
    Fetching,

    /// Records and the next link are being extracted from a page
    Extracting,

    /// Extracted records are being checked against already-seen keys
    Deduping,

    /// New records are being written to the output
    Persisting,

    /// Deciding whether to follow the next link
    Deciding,

    // ===== Terminal States =====
    /// The run finished normally
    Done,

    /// The run stopped early (policy stop, fatal error, or interrupt)
    Aborted,
}

impl CrawlState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    ///
    /// `Persisting` may be skipped (dry-run), so `Deduping` can go straight to
    /// `Deciding`. Any active state may abort.
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        use CrawlState::*;

        if self.is_terminal() {
            return false;
        }

        matches!(
            (*self, next),
            (Idle, Fetching)
                | (Fetching, Extracting)
                | (Extracting, Deduping)
                | (Deduping, Persisting)
                | (Deduping, Deciding)
                | (Persisting, Deciding)
                | (Deciding, Fetching)
                | (Deciding, Done)
                | (_, Aborted)
        )
    }

    /// Returns a short lowercase name for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Deduping => "deduping",
            Self::Persisting => "persisting",
            Self::Deciding => "deciding",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
