//! Pause/resume/stop control shared between a running crawl and its caller

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Snapshot of the externally requested control flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlState {
    pub paused: bool,
    pub stopped: bool,
}

/// Handle through which a caller pauses, resumes or stops a crawl
///
/// The crawl loop checks this once per frontier pop. Stop is terminal:
/// after it, `pause` and `resume` are no-ops. Every transition wakes any
/// sleeping waiters so that stop cuts politeness delays short.
///
/// ```
/// use sumi_gather::state::CrawlControl;
///
/// let control = CrawlControl::new();
/// assert!(control.pause());
/// assert!(control.stop());
/// assert!(!control.resume());
/// assert!(control.snapshot().stopped);
/// ```
#[derive(Debug, Default)]
pub struct CrawlControl {
    state: Mutex<ControlState>,
    wake: Notify,
}

impl CrawlControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a pause; returns false if the crawl is stopped or already paused
    pub fn pause(&self) -> bool {
        let changed = {
            let mut state = self.lock();
            if state.stopped || state.paused {
                false
            } else {
                state.paused = true;
                true
            }
        };
        if changed {
            tracing::info!("Pause requested");
        }
        changed
    }

    /// Clears a pause; returns false if the crawl is stopped or not paused
    pub fn resume(&self) -> bool {
        let changed = {
            let mut state = self.lock();
            if state.stopped || !state.paused {
                false
            } else {
                state.paused = false;
                true
            }
        };
        if changed {
            tracing::info!("Resume requested");
            self.wake.notify_waiters();
        }
        changed
    }

    /// Requests a stop; returns false if already stopped
    pub fn stop(&self) -> bool {
        let changed = {
            let mut state = self.lock();
            if state.stopped {
                false
            } else {
                state.stopped = true;
                state.paused = false;
                true
            }
        };
        if changed {
            tracing::info!("Stop requested");
            self.wake.notify_waiters();
        }
        changed
    }

    pub fn snapshot(&self) -> ControlState {
        *self.lock()
    }

    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    pub fn is_paused(&self) -> bool {
        self.lock().paused
    }

    /// Blocks while paused, re-checking at least every `poll`
    ///
    /// Returns false once the crawl is stopped, true when it may continue.
    pub async fn wait_while_paused(&self, poll: Duration) -> bool {
        loop {
            let notified = self.wake.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let state = self.snapshot();
            if state.stopped {
                return false;
            }
            if !state.paused {
                return true;
            }

            tokio::select! {
                _ = tokio::time::sleep(poll) => {}
                _ = &mut notified => {}
            }
        }
    }

    /// Sleeps for `duration` unless a stop arrives first
    ///
    /// Returns false if the crawl is (or became) stopped. Pause and resume do
    /// not shorten the sleep.
    pub async fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            let notified = self.wake.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_stopped() {
                return false;
            }
            if Instant::now() >= deadline {
                return true;
            }

            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => return !self.is_stopped(),
                _ = &mut notified => {}
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControlState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
