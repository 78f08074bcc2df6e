//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing every subscription event to the
//! `log` facade (serial console on a board, stderr on the host demo).

use log::info;

use crate::app::ports::EventSink;
use crate::subscription::{EventSource, SubscriptionEvent};

/// Adapter that logs every [`SubscriptionEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink {
    emitted: u64,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self { emitted: 0 }
    }

    /// Events logged so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &SubscriptionEvent) {
        self.emitted += 1;
        match event.source() {
            EventSource::Clock => {
                info!("CLOCK | #{} | delta={:?}", self.emitted, event.delta());
            }
            EventSource::Pin { pin, edge } => {
                info!(
                    "PIN   | #{} | pin={} filter={:?} observed={:?}",
                    self.emitted,
                    pin,
                    edge,
                    event.result().edge,
                );
            }
        }
    }
}
