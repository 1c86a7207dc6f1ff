//! Ready-made event sinks

use super::traits::{DiscoveryEvent, EventSink};
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Sink that forwards events into an unbounded tokio channel
///
/// A web handler or CLI drains the receiver. If the receiver is gone the
/// events are dropped.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: UnboundedSender<DiscoveryEvent>,
    prefix: Option<String>,
}

impl ChannelSink {
    /// Creates a sink and the receiver that drains it
    pub fn channel() -> (Self, UnboundedReceiver<DiscoveryEvent>) {
        let (sender, receiver) = unbounded_channel();
        (
            Self {
                sender,
                prefix: None,
            },
            receiver,
        )
    }

    /// Prepends `prefix` (e.g. `/images`) to every image path
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        self.prefix = (!prefix.is_empty()).then(|| prefix.to_string());
        self
    }

    fn send(&self, event: DiscoveryEvent) {
        if self.sender.send(event).is_err() {
            tracing::debug!("Discovery receiver closed; dropping event");
        }
    }
}

impl EventSink for ChannelSink {
    fn push(&self, servable_path: &str) {
        let path = match &self.prefix {
            Some(prefix) => format!("{}/{}", prefix, servable_path),
            None => servable_path.to_string(),
        };
        self.send(DiscoveryEvent::Image { path });
    }

    fn push_terminal(&self) {
        self.send(DiscoveryEvent::Finished);
    }
}

/// Sink that records every event in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<DiscoveryEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything pushed so far
    pub fn events(&self) -> Vec<DiscoveryEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the image paths pushed so far, in order
    pub fn paths(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| event.path().map(str::to_string))
            .collect()
    }

    /// Number of terminal signals received
    pub fn terminal_count(&self) -> usize {
        self.events().iter().filter(|e| e.is_terminal()).count()
    }

    fn record(&self, event: DiscoveryEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl EventSink for MemorySink {
    fn push(&self, servable_path: &str) {
        self.record(DiscoveryEvent::Image {
            path: servable_path.to_string(),
        });
    }

    fn push_terminal(&self) {
        self.record(DiscoveryEvent::Finished);
    }
}
