//! Output module for live discovery events and run reports
//!
//! This module handles:
//! - The event sink boundary between the crawl engine and its callers
//! - Channel-backed and in-memory sink implementations
//! - Recording and printing run statistics

mod sink;
pub mod stats;
mod traits;

pub use sink::{ChannelSink, MemorySink};
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{DiscoveryEvent, EventSink};
