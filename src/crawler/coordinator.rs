//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! a single-site image crawl, including:
//! - Seeding the frontier and enforcing depth and page budgets
//! - Honoring pause/resume/stop between frontier pops
//! - Coordinating robots checks, page fetching, image discovery and link extraction
//! - Guaranteeing exactly one terminal signal on the event sink

use crate::config::{validate, Config};
use crate::crawler::frontier::{FrontierEntry, Frontier};
use crate::crawler::parser::parse_page;
use crate::crawler::{Fetcher, HttpFetcher};
use crate::images::{GalleryProvider, IconFilter, ImagePipeline, ImageRecord, ResolutionLadder};
use crate::output::{CrawlStatistics, EventSink};
use crate::robots::RobotsCache;
use crate::state::{CrawlControl, RunState};
use crate::storage::{ImageStore, LocalImageStore};
use crate::url::{extract_netloc, extract_origin, is_file_download, is_same_site, normalize_seed};
use crate::{GatherError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Everything one crawl run needs; immutable for the run
#[derive(Clone)]
pub struct CrawlJob {
    /// Seed URL as given by the user (scheme optional)
    pub seed: String,
    /// Budgets, timeouts, identity, output root and image policy
    pub config: Config,
    /// Receives discovery events and the terminal signal
    pub sink: Arc<dyn EventSink>,
    /// Pause/resume/stop handle shared with the caller
    pub control: Arc<CrawlControl>,
}

impl CrawlJob {
    pub fn new(seed: &str, config: Config, sink: Arc<dyn EventSink>) -> Self {
        Self {
            seed: seed.to_string(),
            config,
            sink,
            control: Arc::new(CrawlControl::new()),
        }
    }

    /// Uses an existing control handle instead of a fresh one
    pub fn with_control(mut self, control: Arc<CrawlControl>) -> Self {
        self.control = control;
        self
    }

    /// Returns a handle for pausing, resuming or stopping the run
    pub fn control(&self) -> Arc<CrawlControl> {
        self.control.clone()
    }
}

impl std::fmt::Debug for CrawlJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlJob")
            .field("seed", &self.seed)
            .field("config", &self.config)
            .field("control", &self.control)
            .finish_non_exhaustive()
    }
}

/// What happened to one dequeued page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Fetched, parsed and mined for images and links
    Crawled { images: usize, links_queued: usize },
    /// robots.txt disallows the page
    RobotsDenied,
    /// The request itself failed (timeout, connection, body)
    FetchFailed(String),
    /// The server answered with a non-2xx status
    HttpStatus(u16),
    /// The response was not HTML
    NotHtml(Option<String>),
    /// A stop arrived while waiting out the politeness delay
    Interrupted,
}

impl PageOutcome {
    /// Returns true for outcomes counted as failed pages
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed(_) | Self::HttpStatus(_) | Self::NotHtml(_)
        )
    }
}

/// Result of a finished run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Directory holding this domain's images
    pub domain_output_dir: PathBuf,
    /// Distinct images saved during the run
    pub images_saved: u64,
    /// Saved images in discovery order
    pub images: Vec<ImageRecord>,
    pub stats: CrawlStatistics,
    /// `Completed` or `Stopped`
    pub state: RunState,
}

/// Sends the terminal signal exactly once, on drop at the latest
struct TerminalGuard {
    sink: Arc<dyn EventSink>,
    sent: bool,
}

impl TerminalGuard {
    fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink, sent: false }
    }

    fn send(&mut self) {
        if !self.sent {
            self.sent = true;
            self.sink.push_terminal();
        }
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        self.send();
    }
}

/// Per-run mutable state
struct RunContext {
    seed: Url,
    netloc: String,
    frontier: Frontier,
    robots: RobotsCache,
    pipeline: ImagePipeline,
    stats: CrawlStatistics,
    images: Vec<ImageRecord>,
    state: RunState,
}

impl RunContext {
    fn transition(&mut self, to: RunState) -> Result<()> {
        if !self.state.can_transition_to(&to) {
            return Err(GatherError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        tracing::debug!("Run state: {} -> {}", self.state, to);
        self.state = to;
        Ok(())
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    job: CrawlJob,
    fetcher: Arc<dyn Fetcher>,
    provider: Option<Arc<dyn GalleryProvider>>,
}

impl Coordinator {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// If the HTTP client cannot be built the terminal signal is still sent.
    pub fn new(job: CrawlJob) -> Result<Self> {
        match HttpFetcher::new(&job.config.user_agent) {
            Ok(fetcher) => Ok(Self::with_fetcher(job, Arc::new(fetcher))),
            Err(e) => {
                tracing::error!("Failed to build HTTP client: {}", e);
                job.sink.push_terminal();
                Err(e.into())
            }
        }
    }

    /// Creates a coordinator over a caller-supplied transport
    pub fn with_fetcher(job: CrawlJob, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            job,
            fetcher,
            provider: None,
        }
    }

    /// Plugs in a gallery expansion provider for browser-assist runs
    pub fn with_gallery_provider(mut self, provider: Arc<dyn GalleryProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn control(&self) -> Arc<CrawlControl> {
        self.job.control()
    }

    /// Runs the crawl to completion or stop
    ///
    /// The sink receives exactly one terminal signal however this returns,
    /// including on setup errors and panics.
    pub async fn run(self) -> Result<CrawlReport> {
        let mut terminal = TerminalGuard::new(self.job.sink.clone());

        let result = self.run_inner().await;
        if let Err(e) = &result {
            tracing::error!("Crawl failed: {}", e);
        }

        terminal.send();
        result
    }

    async fn run_inner(&self) -> Result<CrawlReport> {
        let config = &self.job.config;
        validate(config)?;

        let mut ctx = self.prepare()?;
        tracing::info!(
            "Starting crawl of {} (max pages: {}, max depth: {}, pagination: {})",
            ctx.seed,
            config.crawler.max_pages,
            config.crawler.max_depth,
            config.crawler.follow_pagination
        );

        ctx.frontier.push(ctx.seed.clone(), 0, false);

        if config.crawler.use_browser_assist {
            self.browser_assist(&mut ctx).await;
        }

        self.crawl_loop(&mut ctx).await?;

        let counters = ctx.pipeline.counters();
        ctx.stats.images_saved = counters.saved;
        ctx.stats.duplicates_by_reference = counters.duplicates_by_reference;
        ctx.stats.duplicates_by_content = counters.duplicates_by_content;
        ctx.stats.icons_filtered = counters.icons_filtered;
        ctx.stats.image_failures = counters.failures;
        ctx.stats.finish(ctx.state);

        let domain_output_dir = ctx.pipeline.store().location().to_path_buf();
        tracing::info!(
            "Crawl {}: {} pages, {} images saved to {}",
            ctx.state,
            ctx.stats.pages_crawled,
            counters.saved,
            domain_output_dir.display()
        );

        Ok(CrawlReport {
            domain_output_dir,
            images_saved: counters.saved,
            images: ctx.images,
            stats: ctx.stats,
            state: ctx.state,
        })
    }

    /// Normalizes the seed and builds the per-run state
    fn prepare(&self) -> Result<RunContext> {
        let config = &self.job.config;

        let seed = normalize_seed(&self.job.seed)
            .map_err(|e| GatherError::InvalidSeed(format!("{} ({})", self.job.seed, e)))?;
        let netloc = extract_netloc(&seed)
            .ok_or_else(|| GatherError::InvalidSeed(self.job.seed.clone()))?;

        let store = LocalImageStore::open(Path::new(&config.output.output_root), &netloc)?;
        let pipeline = ImagePipeline::new(
            IconFilter::from_config(&config.images)?,
            ResolutionLadder::from_config(&config.images),
            Duration::from_secs(config.crawler.image_timeout_secs),
            &netloc,
            Box::new(store),
        );

        let robots = RobotsCache::new(
            &config.user_agent.crawler_name,
            self.politeness_delay(),
            Duration::from_secs(config.crawler.page_timeout_secs),
        );

        Ok(RunContext {
            seed,
            netloc,
            frontier: Frontier::new(config.crawler.max_pages, config.crawler.follow_pagination),
            robots,
            pipeline,
            stats: CrawlStatistics::new(),
            images: Vec::new(),
            state: RunState::Running,
        })
    }

    async fn crawl_loop(&self, ctx: &mut RunContext) -> Result<()> {
        let control = self.job.control.as_ref();
        let crawler = &self.job.config.crawler;
        let poll = Duration::from_millis(crawler.pause_poll_ms);

        loop {
            let snapshot = control.snapshot();
            if snapshot.stopped {
                tracing::info!("Crawl stopped by request");
                ctx.transition(RunState::Stopped)?;
                break;
            }
            if snapshot.paused {
                ctx.transition(RunState::Paused)?;
                tracing::info!("Crawl paused");
                if !control.wait_while_paused(poll).await {
                    tracing::info!("Crawl stopped while paused");
                    ctx.transition(RunState::Stopped)?;
                    break;
                }
                tracing::info!("Crawl resumed");
                ctx.transition(RunState::Running)?;
            }

            if ctx.stats.pages_crawled >= crawler.max_pages as u64 {
                tracing::info!("Page budget of {} reached", crawler.max_pages);
                ctx.transition(RunState::Completed)?;
                break;
            }

            let Some(entry) = ctx.frontier.pop() else {
                tracing::info!("Frontier is empty, crawl complete");
                ctx.transition(RunState::Completed)?;
                break;
            };

            if !ctx.frontier.mark_visited(&entry.url) {
                tracing::debug!("Skipping already visited URL: {}", entry.url);
                continue;
            }
            ctx.stats.pages_crawled += 1;
            tracing::info!(
                "[{}/{}] Crawling: {}",
                ctx.stats.pages_crawled,
                crawler.max_pages,
                entry.url
            );

            let outcome = self.crawl_page(ctx, &entry).await;
            match &outcome {
                PageOutcome::Crawled {
                    images,
                    links_queued,
                } => tracing::info!(
                    "Found and processed {} new images on {} ({} links queued)",
                    images,
                    entry.url,
                    links_queued
                ),
                PageOutcome::RobotsDenied => {
                    ctx.stats.pages_robots_skipped += 1;
                    tracing::warn!("Skipping {} due to robots.txt", entry.url);
                }
                PageOutcome::FetchFailed(message) => {
                    tracing::warn!("Failed to fetch page {}: {}", entry.url, message)
                }
                PageOutcome::HttpStatus(status) => {
                    tracing::warn!("Skipping {}: HTTP {}", entry.url, status)
                }
                PageOutcome::NotHtml(content_type) => tracing::info!(
                    "Skipping non-HTML page: {} (Content-Type: {})",
                    entry.url,
                    content_type.as_deref().unwrap_or("none")
                ),
                PageOutcome::Interrupted => {}
            }
            if outcome.is_failure() {
                ctx.stats.pages_failed += 1;
            }
        }

        Ok(())
    }

    /// Processes a single dequeued page
    async fn crawl_page(&self, ctx: &mut RunContext, entry: &FrontierEntry) -> PageOutcome {
        let fetcher = self.fetcher.as_ref();
        let control = self.job.control.as_ref();
        let crawler = &self.job.config.crawler;

        if !ctx.robots.can_fetch(fetcher, control, &entry.url).await {
            return PageOutcome::RobotsDenied;
        }

        let fetched = fetcher
            .fetch(
                entry.url.as_str(),
                Duration::from_secs(crawler.page_timeout_secs),
            )
            .await;

        let delay = self.page_delay(ctx, &entry.url);
        if !control.sleep(delay).await {
            return PageOutcome::Interrupted;
        }

        let response = match fetched {
            Ok(response) => response,
            Err(e) => return PageOutcome::FetchFailed(e.to_string()),
        };
        if !response.is_success() {
            return PageOutcome::HttpStatus(response.status);
        }
        if !response.is_html() {
            return PageOutcome::NotHtml(response.content_type);
        }

        // Relative references resolve against the post-redirect URL
        let base = Url::parse(&response.final_url).unwrap_or_else(|_| entry.url.clone());
        let parsed = parse_page(&response.text(), &base);

        let records = ctx
            .pipeline
            .discover_images(
                fetcher,
                self.job.sink.as_ref(),
                control,
                &parsed.image_candidates,
                &base,
            )
            .await;
        let images = records.len();
        ctx.images.extend(records);

        let mut links_queued = 0;
        if entry.depth < crawler.max_depth {
            for link in parsed.links {
                if !is_same_site(&link.url, &ctx.netloc) || is_file_download(&link.url) {
                    continue;
                }
                if ctx
                    .frontier
                    .push(link.url, entry.depth + 1, link.is_pagination)
                    .is_queued()
                {
                    links_queued += 1;
                }
            }
        }

        PageOutcome::Crawled {
            images,
            links_queued,
        }
    }

    /// Feeds the provider's images for the seed page through the pipeline
    ///
    /// Runs once, before the main loop, outside the depth and page budgets.
    async fn browser_assist(&self, ctx: &mut RunContext) {
        let Some(provider) = self.provider.as_ref() else {
            tracing::warn!("Browser assist requested but no gallery provider is configured");
            return;
        };

        let fetcher = self.fetcher.as_ref();
        let control = self.job.control.as_ref();
        let seed = ctx.seed.clone();

        if !ctx.robots.can_fetch(fetcher, control, &seed).await {
            tracing::warn!("Skipping browser assist for {} due to robots.txt", seed);
            return;
        }

        tracing::info!("Running browser assist for {}", seed);
        let mut urls = match provider.discover_interactive_images(&seed).await {
            Ok(urls) => urls,
            Err(e) => {
                tracing::warn!("Browser assist failed: {}", e);
                return;
            }
        };
        urls.sort();
        urls.dedup();

        let records = ctx
            .pipeline
            .discover_images(fetcher, self.job.sink.as_ref(), control, &urls, &seed)
            .await;
        tracing::info!(
            "Browser assist found {} new images out of {} candidates",
            records.len(),
            urls.len()
        );
        ctx.images.extend(records);
    }

    fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.job.config.crawler.politeness_delay_ms)
    }

    /// Configured delay, raised to the origin's robots crawl-delay if longer
    ///
    /// The robots value is capped at `max_crawl_delay_ms`.
    fn page_delay(&self, ctx: &RunContext, url: &Url) -> Duration {
        let cap = Duration::from_millis(self.job.config.crawler.max_crawl_delay_ms);
        let robots_delay = extract_origin(url)
            .and_then(|origin| ctx.robots.crawl_delay(&origin))
            .unwrap_or_default();
        if robots_delay > cap {
            tracing::warn!(
                "robots.txt crawl-delay of {:?} for {} exceeds the {:?} cap",
                robots_delay,
                url,
                cap
            );
        }
        self.politeness_delay().max(robots_delay.min(cap))
    }
}
