//! Sumi-Gather: a polite single-site image gatherer
//!
//! This crate walks one web site breadth-first from a seed URL, discovers the
//! images its pages reference, and saves each distinct image exactly once to a
//! per-domain directory while streaming discovery events to a caller-supplied
//! sink. Crawl depth and page count are bounded, robots.txt is respected, and a
//! running crawl can be paused, resumed, or stopped.

pub mod config;
pub mod crawler;
pub mod images;
pub mod output;
pub mod robots;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Gather operations
///
/// Only orchestration failures surface as `GatherError`. Per-page and
/// per-image problems (timeouts, 404s, duplicates, robots denials) are
/// recorded as skip outcomes and never abort a run.
#[derive(Debug, Error)]
pub enum GatherError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL: {0}")]
    InvalidSeed(String),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid run state transition from {from} to {to}")]
    InvalidTransition {
        from: state::RunState,
        to: state::RunState,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern in config: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Sumi-Gather operations
pub type Result<T> = std::result::Result<T, GatherError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{gather, Coordinator, CrawlJob, CrawlReport};
pub use output::{ChannelSink, DiscoveryEvent, EventSink};
pub use state::{CrawlControl, RunState};
pub use url::canonicalize;
