//! Configuration module for Sumi-Gather
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every key has a default, so a run can also be configured entirely
//! from command-line flags.
//!
//! # Example
//!
//! ```no_run
//! use sumi_gather::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("gather.toml")).unwrap();
//! println!("Crawler will visit at most {} pages", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, ImagesConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate, MAX_HIGH_RES_QUERIES};
