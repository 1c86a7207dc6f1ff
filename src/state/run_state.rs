/// Run state definitions for a crawl
///
/// This module defines the states a single crawl run moves through.
use std::fmt;

/// Represents the current state of a crawl run
///
/// ```text
/// Running ⇄ Paused
///    │        │
///    ├────────┴──► Stopped
///    └───────────► Completed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    // ===== Active States =====
    /// The crawl loop is pulling pages from the frontier
    Running,

    /// An external pause was observed; the loop is waiting for resume or stop
    Paused,

    // ===== Terminal States =====
    /// An external stop was observed
    Stopped,

    /// The frontier was exhausted or the page budget consumed
    Completed,
}

impl RunState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::Completed)
    }

    /// Returns true if the loop may still do work in this state
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns a stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
            Self::Completed => "completed",
        }
    }

    /// Validates if a transition from this state to another is allowed
    ///
    /// `Completed` is only reachable from `Running`; a paused crawl must be
    /// resumed (or stopped) first.
    pub fn can_transition_to(&self, target: &RunState) -> bool {
        match (self, target) {
            (Self::Running, Self::Paused)
            | (Self::Running, Self::Stopped)
            | (Self::Running, Self::Completed)
            | (Self::Paused, Self::Running)
            | (Self::Paused, Self::Stopped) => true,
            (from, to) if from == to => from.is_active(),
            _ => false,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
