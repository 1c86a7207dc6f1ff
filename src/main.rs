//! Sumi-Gather main entry point
//!
//! This is the command-line interface for the Sumi-Gather image crawler.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sumi_gather::config::{load_config_with_hash, validate, Config};
use sumi_gather::images::StaticGalleryProvider;
use sumi_gather::output::{print_statistics, ChannelSink, DiscoveryEvent};
use sumi_gather::{Coordinator, CrawlJob};
use tracing_subscriber::EnvFilter;

/// Sumi-Gather: A polite single-site image gatherer
///
/// Sumi-Gather crawls one website breadth-first from a seed URL while
/// respecting robots.txt, and saves every distinct image it finds into a
/// per-domain directory.
#[derive(Parser, Debug)]
#[command(name = "sumi-gather")]
#[command(version)]
#[command(about = "A polite single-site image gatherer", long_about = None)]
struct Cli {
    /// The starting URL to crawl (https:// is assumed if no scheme is given)
    #[arg(value_name = "URL")]
    seed: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Directory to save images into
    #[arg(short, long, env = "OUTPUT_DIR", value_name = "DIR")]
    output: Option<String>,

    /// Maximum number of pages to crawl
    #[arg(long, env = "MAX_PAGES")]
    max_pages: Option<usize>,

    /// Maximum link depth from the seed page
    #[arg(long)]
    max_depth: Option<u32>,

    /// Do not prioritize pagination links
    #[arg(long)]
    no_pagination: bool,

    /// File of gallery image URLs (one per line) fed through the image
    /// pipeline before the crawl starts
    #[arg(long, value_name = "FILE")]
    gallery_urls: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let gallery = match &cli.gallery_urls {
        Some(path) => Some(load_gallery_urls(path)?),
        None => None,
    };
    tracing::info!("Starting CLI crawl for: {}", cli.seed);
    tracing::info!("Output directory: {}", config.output.output_root);
    tracing::info!("Follow pagination: {}", config.crawler.follow_pagination);
    tracing::info!("Max pages: {}", config.crawler.max_pages);

    let (sink, mut events) = ChannelSink::channel();
    let job = CrawlJob::new(&cli.seed, config, Arc::new(sink));
    let control = job.control();

    // Print discoveries as they arrive
    let quiet = cli.quiet;
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                DiscoveryEvent::Image { path } if !quiet => println!("{}", path),
                DiscoveryEvent::Image { .. } => {}
                DiscoveryEvent::Finished => break,
            }
        }
    });

    // First Ctrl-C stops the crawl gracefully
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            control.stop();
        }
    });

    let mut coordinator = Coordinator::new(job)?;
    if let Some(urls) = gallery {
        tracing::info!("Loaded {} gallery URLs", urls.len());
        coordinator = coordinator.with_gallery_provider(Arc::new(StaticGalleryProvider::new(urls)));
    }

    let result = coordinator.run().await;
    if let Err(e) = printer.await {
        tracing::debug!("Event printer ended abnormally: {}", e);
    }

    let report = result.with_context(|| format!("Crawl of {} failed", cli.seed))?;

    if !cli.quiet {
        println!();
        print_statistics(&report.stats);
    }
    tracing::info!(
        "Saved {} images to {}",
        report.images_saved,
        report.domain_output_dir.display()
    );

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_gather=info,warn"),
            1 => EnvFilter::new("sumi_gather=debug,info"),
            2 => EnvFilter::new("sumi_gather=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the optional config file and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(output) = &cli.output {
        config.output.output_root = output.clone();
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if cli.no_pagination {
        config.crawler.follow_pagination = false;
    }
    if cli.gallery_urls.is_some() {
        config.crawler.use_browser_assist = true;
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Reads gallery image URLs, one per line; blank lines and `#` comments are skipped
fn load_gallery_urls(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read gallery URLs from {}", path.display()))?;
    Ok(parse_gallery_urls(&content))
}

fn parse_gallery_urls(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
