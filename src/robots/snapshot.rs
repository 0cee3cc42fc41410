//! Resolved robots.txt policy for one origin

use crate::robots::ParsedRobots;
use chrono::{DateTime, Utc};
use std::time::Duration;
use url::Url;

/// Robots rules for one origin, resolved once per run and read-only thereafter
///
/// A snapshot built from an unreachable robots.txt allows everything and
/// reports no crawl delay.
#[derive(Debug, Clone)]
pub struct PolicySnapshot {
    /// The parsed robots.txt content
    robots: ParsedRobots,

    /// Robots product token the rules are evaluated for
    agent: String,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,
}

impl PolicySnapshot {
    /// Creates a snapshot from parsed robots.txt content
    pub fn new(robots: ParsedRobots, agent: impl Into<String>) -> Self {
        Self {
            robots,
            agent: agent.into(),
            fetched_at: Utc::now(),
        }
    }

    /// Creates the permissive fallback snapshot
    pub fn allow_all(agent: impl Into<String>) -> Self {
        Self::new(ParsedRobots::allow_all(), agent)
    }

    /// Returns the robots product token used for evaluation
    pub fn agent(&self) -> &str {
        &self.agent
    }

    /// Returns true if the snapshot is the permissive fallback
    pub fn is_allow_all(&self) -> bool {
        self.robots.is_allow_all()
    }

    /// Checks if a URL may be fetched
    ///
    /// A disallow decision is logged as a warning; it is never an error.
    pub fn is_allowed(&self, url: &Url) -> bool {
        let allowed = self.robots.is_allowed(url.as_str(), &self.agent);
        if !allowed {
            tracing::warn!(url = %url, agent = %self.agent, "Blocked by robots.txt");
        }
        allowed
    }

    /// Returns the crawl delay requested for this agent, if any
    pub fn crawl_delay(&self) -> Option<Duration> {
        self.robots
            .crawl_delay(&self.agent)
            .map(|secs| Duration::from_millis((secs * 1000.0) as u64))
    }

    /// Returns the crawl delay in milliseconds, 0 when absent
    pub fn crawl_delay_ms(&self) -> u64 {
        self.crawl_delay().map_or(0, |d| d.as_millis() as u64)
    }
}
