//! Events produced by a running [`SubscriptionService`](super::SubscriptionService).

use core::time::Duration;

use crate::pins::{EdgeType, WaitResult};

/// Which pool slot produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSource {
    /// A pin-edge subscription; `edge` is the subscribed filter.
    Pin { pin: i32, edge: EdgeType },
    /// The periodic clock.
    Clock,
}

/// One item of the merged event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionEvent {
    source: EventSource,
    result: WaitResult,
    delta: Duration,
}

impl SubscriptionEvent {
    pub fn new(source: EventSource, result: WaitResult, delta: Duration) -> Self {
        Self {
            source,
            result,
            delta,
        }
    }

    pub fn source(&self) -> EventSource {
        self.source
    }

    /// Raw result of the wait that completed.
    pub fn result(&self) -> WaitResult {
        self.result
    }

    /// Zero for pin events; time since the previous clock event for clock
    /// events.
    pub fn delta(&self) -> Duration {
        self.delta
    }

    pub fn is_clock(&self) -> bool {
        matches!(self.source, EventSource::Clock)
    }

    /// Pin number for pin events.
    pub fn pin(&self) -> Option<i32> {
        match self.source {
            EventSource::Pin { pin, .. } => Some(pin),
            EventSource::Clock => None,
        }
    }
}
