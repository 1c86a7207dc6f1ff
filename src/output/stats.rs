//! Run statistics
//!
//! Counters collected during one crawl run and a console report for them.

use crate::state::RunState;
use chrono::{DateTime, Utc};

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Pages dequeued and counted against the page budget
    pub pages_crawled: u64,

    /// Pages skipped because robots.txt disallowed them
    pub pages_robots_skipped: u64,

    /// Pages whose fetch failed, was non-2xx, or was not HTML
    pub pages_failed: u64,

    /// Distinct images written to disk
    pub images_saved: u64,

    /// Candidates skipped because their canonical URL was already processed
    pub duplicates_by_reference: u64,

    /// Downloads discarded because identical bytes were already saved
    pub duplicates_by_content: u64,

    /// Candidates discarded by the icon/chrome filter
    pub icons_filtered: u64,

    /// Candidates for which every download variant failed
    pub image_failures: u64,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// How the run ended
    pub final_state: RunState,
}

impl CrawlStatistics {
    /// Creates empty statistics for a run starting now
    pub fn new() -> Self {
        Self {
            pages_crawled: 0,
            pages_robots_skipped: 0,
            pages_failed: 0,
            images_saved: 0,
            duplicates_by_reference: 0,
            duplicates_by_content: 0,
            icons_filtered: 0,
            image_failures: 0,
            started_at: Utc::now(),
            finished_at: None,
            final_state: RunState::Running,
        }
    }

    /// Records the end of the run
    pub fn finish(&mut self, state: RunState) {
        self.finished_at = Some(Utc::now());
        self.final_state = state;
    }

    /// Wall-clock duration, once finished
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|finished| finished - self.started_at)
    }

    /// Pages that were fetched and parsed successfully
    pub fn pages_succeeded(&self) -> u64 {
        self.pages_crawled
            .saturating_sub(self.pages_robots_skipped + self.pages_failed)
    }

    /// Returns the page success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.pages_crawled == 0 {
            return 0.0;
        }
        (self.pages_succeeded() as f64 / self.pages_crawled as f64) * 100.0
    }
}

impl Default for CrawlStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Run:");
    println!("  Final state: {}", stats.final_state);
    println!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(duration) = stats.duration() {
        println!(
            "  Duration: {:.1}s",
            duration.num_milliseconds() as f64 / 1000.0
        );
    }
    println!();

    println!("Pages:");
    println!("  Crawled: {}", stats.pages_crawled);
    println!("  Blocked by robots.txt: {}", stats.pages_robots_skipped);
    println!("  Failed: {}", stats.pages_failed);
    println!();

    println!("Images:");
    println!("  Saved: {}", stats.images_saved);
    println!("  Duplicate references: {}", stats.duplicates_by_reference);
    println!("  Duplicate content: {}", stats.duplicates_by_content);
    println!("  Filtered as icons: {}", stats.icons_filtered);
    println!("  Download failures: {}", stats.image_failures);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} pages successfully processed)",
        stats.success_rate(),
        stats.pages_succeeded(),
        stats.pages_crawled
    );
}
