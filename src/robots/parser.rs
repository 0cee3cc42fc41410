//! Robots.txt parser implementation
//!
//! Allow/deny matching is delegated to the robotstxt crate; the crawl-delay
//! directive, which that crate ignores, is parsed here.

use robotstxt::DefaultMatcher;

/// Extracts the product token from a User-agent value
///
/// Mirrors the matcher: the leading run of `[A-Za-z_-]`, compared
/// case-insensitively. Returns None for the `*` wildcard and for values with
/// no token.
pub fn product_token(value: &str) -> Option<String> {
    let value = value.trim();
    if value.starts_with('*') {
        return None;
    }

    let token: String = value
        .chars()
        .take_while(|c| c.is_ascii_alphabetic() || *c == '-' || *c == '_')
        .collect();

    if token.is_empty() {
        None
    } else {
        Some(token.to_lowercase())
    }
}

fn is_wildcard(value: &str) -> bool {
    let value = value.trim();
    value == "*" || value.starts_with("* ") || value.starts_with("*\t")
}

/// Parsed robots.txt data
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content (empty string means allow all)
    content: String,
    /// Whether to allow all (true = allow all, false = parse content)
    allow_all: bool,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// This is used when robots.txt cannot be fetched.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
        }
    }

    /// Returns true if this is the permissive fallback
    pub fn is_allow_all(&self) -> bool {
        self.allow_all
    }

    /// Returns the raw robots.txt content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Checks if a URL is allowed for the given robots product token
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL to check
    /// * `agent` - The robots product token (e.g. "book-scraper")
    pub fn is_allowed(&self, url: &str, agent: &str) -> bool {
        if self.allow_all || self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, agent, url)
    }

    /// Gets the crawl delay for a robots product token
    ///
    /// Groups are selected exactly as for allow/deny rules: a group whose
    /// product token equals the agent's replaces the `*` group entirely, even
    /// when it sets no delay. Consecutive `User-agent` lines share one group;
    /// a `User-agent` line that follows any other directive starts a new group.
    ///
    /// # Returns
    ///
    /// * `Some(f64)` - The crawl delay in seconds
    /// * `None` - If no applicable, well-formed crawl delay is specified
    pub fn crawl_delay(&self, agent: &str) -> Option<f64> {
        if self.allow_all || self.content.is_empty() {
            return None;
        }

        let agent = product_token(agent);
        let mut group_is_agent = false;
        let mut group_is_wildcard = false;
        let mut in_agent_lines = false;
        let mut agent_group_seen = false;
        let mut delay_for_wildcard: Option<f64> = None;
        let mut delay_for_agent: Option<f64> = None;

        for line in self.content.lines() {
            let trimmed = line.split('#').next().unwrap_or("").trim();
            if trimmed.is_empty() {
                continue;
            }

            let Some((key, value)) = trimmed.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    if !in_agent_lines {
                        group_is_agent = false;
                        group_is_wildcard = false;
                        in_agent_lines = true;
                    }
                    if is_wildcard(value) {
                        group_is_wildcard = true;
                    } else if agent.is_some() && product_token(value) == agent {
                        group_is_agent = true;
                        agent_group_seen = true;
                    }
                }
                "crawl-delay" => {
                    in_agent_lines = false;
                    let Some(delay) = value
                        .parse::<f64>()
                        .ok()
                        .filter(|d| d.is_finite() && *d >= 0.0)
                    else {
                        continue;
                    };

                    if group_is_agent {
                        delay_for_agent.get_or_insert(delay);
                    } else if group_is_wildcard {
                        delay_for_wildcard.get_or_insert(delay);
                    }
                }
                _ => {
                    in_agent_lines = false;
                }
            }
        }

        if agent_group_seen {
            delay_for_agent
        } else {
            delay_for_wildcard
        }
    }
}
