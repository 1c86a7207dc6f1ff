//! Per-origin robots.txt cache
//!
//! Each origin's robots.txt is fetched at most once per run. A fetch that
//! yields no usable answer (5xx or a transport failure) is remembered as a
//! fail-open sentinel and never retried.

use crate::crawler::Fetcher;
use crate::robots::ParsedRobots;
use crate::state::CrawlControl;
use crate::url::extract_origin;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use url::Url;

/// Robots data cached for one origin
#[derive(Debug, Clone)]
pub struct CachedRobots {
    /// The parsed robots.txt content
    pub content: ParsedRobots,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    pub fn new(content: ParsedRobots) -> Self {
        Self {
            content,
            fetched_at: Utc::now(),
        }
    }

    /// Returns how long ago the robots.txt was fetched
    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.fetched_at
    }
}

/// Cached permission evaluator for an origin
#[derive(Debug, Clone)]
pub enum RobotsEntry {
    /// The server gave a definitive answer
    Rules(CachedRobots),

    /// robots.txt could not be obtained; everything is allowed
    FailOpen,
}

impl RobotsEntry {
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        match self {
            Self::Rules(cached) => cached.content.is_allowed(url, user_agent),
            Self::FailOpen => true,
        }
    }

    pub fn crawl_delay(&self, user_agent: &str) -> Option<Duration> {
        match self {
            Self::Rules(cached) => cached.content.crawl_delay(user_agent),
            Self::FailOpen => None,
        }
    }

    pub fn is_fail_open(&self) -> bool {
        matches!(self, Self::FailOpen)
    }
}

/// Robots compliance cache owned by a single crawl run
#[derive(Debug)]
pub struct RobotsCache {
    /// Product token matched against `User-agent` lines
    user_agent: String,
    /// Delay applied after the first robots fetch of each origin
    politeness_delay: Duration,
    /// Timeout for the robots.txt request itself
    timeout: Duration,
    entries: Mutex<HashMap<String, RobotsEntry>>,
}

impl RobotsCache {
    pub fn new(user_agent: &str, politeness_delay: Duration, timeout: Duration) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            politeness_delay,
            timeout,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns whether `url` may be fetched, populating the cache on first use
    ///
    /// URLs without a host are allowed; they never reach the network anyway.
    pub async fn can_fetch(&self, fetcher: &dyn Fetcher, control: &CrawlControl, url: &Url) -> bool {
        let Some(origin) = extract_origin(url) else {
            return true;
        };

        let entry = match self.entry(&origin) {
            Some(entry) => entry,
            None => {
                let (entry, responded) = self.fetch_entry(fetcher, &origin).await;
                let entry = self.insert(&origin, entry);
                if responded {
                    control.sleep(self.politeness_delay).await;
                }
                entry
            }
        };

        let allowed = entry.is_allowed(url.as_str(), &self.user_agent);
        if !allowed {
            tracing::info!("Blocked by robots.txt: {}", url);
        }
        allowed
    }

    /// Returns the cached entry for an origin, if it was already fetched
    pub fn entry(&self, origin: &str) -> Option<RobotsEntry> {
        self.lock().get(origin).cloned()
    }

    /// Stores an entry unless one already exists, returning the one kept
    pub fn insert(&self, origin: &str, entry: RobotsEntry) -> RobotsEntry {
        self.lock()
            .entry(origin.to_string())
            .or_insert(entry)
            .clone()
    }

    /// Crawl-delay requested by the origin's robots.txt, if any
    pub fn crawl_delay(&self, origin: &str) -> Option<Duration> {
        self.lock()
            .get(origin)
            .and_then(|entry| entry.crawl_delay(&self.user_agent))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetches and interprets `origin/robots.txt`
    ///
    /// The flag reports whether the server answered at all.
    async fn fetch_entry(&self, fetcher: &dyn Fetcher, origin: &str) -> (RobotsEntry, bool) {
        let robots_url = format!("{}/robots.txt", origin);
        tracing::debug!("Fetching {}", robots_url);

        match fetcher.fetch(&robots_url, self.timeout).await {
            Ok(response) => {
                let entry = match response.status {
                    200..=299 => RobotsEntry::Rules(CachedRobots::new(ParsedRobots::from_content(
                        &response.text(),
                    ))),
                    401 | 403 => {
                        tracing::info!(
                            "robots.txt for {} returned {}; treating site as disallowed",
                            origin,
                            response.status
                        );
                        RobotsEntry::Rules(CachedRobots::new(ParsedRobots::disallow_all()))
                    }
                    400..=499 => RobotsEntry::Rules(CachedRobots::new(ParsedRobots::allow_all())),
                    status => {
                        tracing::warn!(
                            "robots.txt for {} returned {}; proceeding without restrictions",
                            origin,
                            status
                        );
                        RobotsEntry::FailOpen
                    }
                };
                (entry, true)
            }
            Err(e) => {
                tracing::warn!(
                    "Could not fetch robots.txt for {} ({}); proceeding without restrictions",
                    origin,
                    e
                );
                (RobotsEntry::FailOpen, false)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, RobotsEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
