//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `RunState`: the lifecycle of a single crawl run
//! - `CrawlControl`: the pause/resume/stop handle shared with callers

mod control;
mod run_state;

// Re-export main types
pub use control::{ControlState, CrawlControl};
pub use run_state::RunState;
