//! Stopwatch application — a consumer of the subscription stream.
//!
//! Clock events accumulate their delta into the elapsed time unless the
//! stopwatch is paused; button presses reset, pause/resume, or stop it.
//!
//! ```text
//!  EventStream ──▶ Stopwatch::apply ──▶ Flow::Continue / Flow::Stop
//!       │
//!       └──────▶ EventSink::emit
//! ```

use core::time::Duration;

use futures_lite::StreamExt;
use log::{debug, info};
use tokio_util::sync::CancellationToken;

use super::ports::{EventSink, PinController};
use crate::config::StopwatchConfig;
use crate::subscription::{SubscriptionEvent, SubscriptionService};

/// Whether the consumer loop keeps going after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Stopwatch state machine.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    elapsed: Duration,
    paused: bool,
    reset_pin: Option<i32>,
    pause_pin: Option<i32>,
    stop_pin: Option<i32>,
}

impl Stopwatch {
    pub fn new(config: &StopwatchConfig) -> Self {
        Self {
            elapsed: Duration::ZERO,
            paused: false,
            reset_pin: config.reset_pin,
            pause_pin: config.pause_pin,
            stop_pin: config.stop_pin,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Fold one event into the state.
    pub fn apply(&mut self, event: &SubscriptionEvent) -> Flow {
        if event.is_clock() {
            if !self.paused {
                self.elapsed += event.delta();
            }
            return Flow::Continue;
        }

        let pin = event.pin();
        if pin.is_some() && pin == self.reset_pin {
            self.elapsed = Duration::ZERO;
        }
        if pin.is_some() && pin == self.pause_pin {
            self.paused = !self.paused;
        }
        if pin.is_some() && pin == self.stop_pin {
            return Flow::Stop;
        }
        Flow::Continue
    }
}

/// Render as `h:mm:ss.fff`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_ms = elapsed.as_millis();
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let seconds = (total_ms / 1_000) % 60;
    let millis = total_ms % 1_000;
    format!("{hours}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// Drive `stopwatch` from `service` until the stop button, cancellation,
/// or a hardware fault.
///
/// Every event is forwarded to `sink` before being applied.  On stop the
/// token is cancelled so outstanding waits unwind.  Returns the final
/// elapsed time.
pub async fn run<C: PinController>(
    service: &SubscriptionService,
    controller: &C,
    cancel: CancellationToken,
    stopwatch: &mut Stopwatch,
    sink: &mut impl EventSink,
) -> crate::Result<Duration> {
    info!("stopwatch started");
    let mut events = service.run(controller, cancel.clone());

    while let Some(event) = events.next().await {
        let event = event?;
        sink.emit(&event);

        let flow = stopwatch.apply(&event);
        debug!(
            "stopwatch {}{}",
            format_elapsed(stopwatch.elapsed()),
            if stopwatch.is_paused() { " (paused)" } else { "" }
        );

        if flow == Flow::Stop {
            cancel.cancel();
            break;
        }
    }

    info!("stopwatch stopped at {}", format_elapsed(stopwatch.elapsed()));
    Ok(stopwatch.elapsed())
}
