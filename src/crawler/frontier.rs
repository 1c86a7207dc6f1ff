//! Crawl frontier
//!
//! A bounded double-ended queue of pages still to visit plus the set of pages
//! already dequeued. Pagination links jump the queue; everything else waits
//! its turn (breadth-first).

use std::collections::{HashSet, VecDeque};
use url::Url;

/// A page waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: Url,

    /// Link distance from the seed (the seed is 0)
    pub depth: u32,
}

/// Result of offering a URL to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Added at the front (pagination)
    QueuedFront,
    /// Added at the back
    QueuedBack,
    /// Already visited or already queued
    AlreadySeen,
    /// Visited plus queued already reaches the page budget
    BudgetExhausted,
}

impl Admission {
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::QueuedFront | Self::QueuedBack)
    }
}

/// Breadth-first frontier with a page budget
///
/// `visited.len() + queued.len()` never exceeds `max_pages`.
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    queued: HashSet<String>,
    visited: HashSet<String>,
    max_pages: usize,
    follow_pagination: bool,
}

impl Frontier {
    pub fn new(max_pages: usize, follow_pagination: bool) -> Self {
        Self {
            queue: VecDeque::new(),
            queued: HashSet::new(),
            visited: HashSet::new(),
            max_pages,
            follow_pagination,
        }
    }

    /// Offers a URL to the frontier
    ///
    /// Pagination links go to the front only when following pagination is
    /// enabled; otherwise they are ordinary links.
    pub fn push(&mut self, url: Url, depth: u32, is_pagination: bool) -> Admission {
        let key = url.as_str();
        if self.visited.contains(key) || self.queued.contains(key) {
            return Admission::AlreadySeen;
        }
        if self.visited.len() + self.queued.len() >= self.max_pages {
            return Admission::BudgetExhausted;
        }

        self.queued.insert(key.to_string());
        let entry = FrontierEntry { url, depth };
        if is_pagination && self.follow_pagination {
            tracing::debug!("Queueing pagination link: {}", entry.url);
            self.queue.push_front(entry);
            Admission::QueuedFront
        } else {
            tracing::debug!("Queueing internal link: {}", entry.url);
            self.queue.push_back(entry);
            Admission::QueuedBack
        }
    }

    /// Takes the next entry to visit
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        let entry = self.queue.pop_front()?;
        self.queued.remove(entry.url.as_str());
        Some(entry)
    }

    /// Records a page as visited; returns false if it already was
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(url.as_str().to_string())
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url.as_str())
    }

    /// Returns true if the URL is visited or queued
    pub fn contains(&self, url: &Url) -> bool {
        self.is_visited(url) || self.queued.contains(url.as_str())
    }

    /// Number of queued entries
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
