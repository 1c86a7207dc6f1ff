//! Event sink trait and discovery event types
//!
//! The crawl engine reports progress only through [`EventSink`]. What happens
//! to the events (SSE framing, printing, buffering) is up to the caller.

use std::fmt;

/// A single item on the live discovery stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryEvent {
    /// A newly saved image, as a servable path (`domain/url-encoded-filename`)
    Image { path: String },

    /// The run is over; no further events follow
    Finished,
}

impl DiscoveryEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Returns the servable path of an image event
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Image { path } => Some(path),
            Self::Finished => None,
        }
    }
}

impl fmt::Display for DiscoveryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image { path } => f.write_str(path),
            Self::Finished => f.write_str("DONE"),
        }
    }
}

/// Output boundary of the crawl engine
///
/// Implementations may drop, buffer or block. The engine never retries a
/// push, and treats the sink as closed after `push_terminal`.
pub trait EventSink: Send + Sync {
    /// Reports a newly accepted image
    ///
    /// # Arguments
    ///
    /// * `servable_path` - `domain/url-encoded-filename`
    fn push(&self, servable_path: &str);

    /// Reports the end of the run
    ///
    /// Called exactly once per run, after every `push`.
    fn push_terminal(&self);
}
