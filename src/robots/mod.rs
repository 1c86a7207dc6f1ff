//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching
//! robots.txt files. A successfully parsed file is always honored exactly;
//! an origin whose robots.txt cannot be obtained is crawled fail-open.

mod cache;
mod parser;

pub use cache::{CachedRobots, RobotsCache, RobotsEntry};
pub use parser::ParsedRobots;
