//! Crawler module for single-site image gathering
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `Fetcher` transport trait
//! - HTML parsing for image candidates and links
//! - The bounded breadth-first frontier
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::{Coordinator, CrawlJob, CrawlReport, PageOutcome};
pub use fetcher::{build_http_client, FetchError, FetchResponse, Fetcher, HttpFetcher};
pub use frontier::{Admission, Frontier, FrontierEntry};
pub use parser::{
    image_candidate, is_pagination_link, parse_page, PageElement, PageLink, ParsedPage,
};

use crate::Result;

/// Runs a complete crawl over HTTP
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Normalize the seed and open the domain's output directory
/// 2. Check robots.txt and fetch pages breadth-first
/// 3. Download, deduplicate and save the images each page references
/// 4. Stream every saved image to the job's sink
/// 5. Send the terminal signal and return the run report
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use sumi_gather::{gather, ChannelSink, Config, CrawlJob};
///
/// # async fn example() -> sumi_gather::Result<()> {
/// let (sink, _events) = ChannelSink::channel();
/// let job = CrawlJob::new("example.com", Config::default(), Arc::new(sink));
/// let report = gather(job).await?;
/// println!("{} images in {}", report.images_saved, report.domain_output_dir.display());
/// # Ok(())
/// # }
/// ```
pub async fn gather(job: CrawlJob) -> Result<CrawlReport> {
    Coordinator::new(job)?.run().await
}
