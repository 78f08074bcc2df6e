//! Port traits — the boundary between the multiplexer and the outside world.
//!
//! ```text
//!   PinController adapter ──▶ SubscriptionService ──▶ EventStream ──▶ EventSink
//! ```
//!
//! Driven adapters (simulated pins, polled HAL pins, real GPIO drivers)
//! implement [`PinController`].  The service borrows one for the life of an
//! event stream and never touches hardware directly.

use core::time::Duration;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::error::HardwareFault;
use crate::pins::{EdgeType, PinMode, WaitResult};
use crate::subscription::SubscriptionEvent;

// ───────────────────────────────────────────────────────────────
// Pin controller port (driven adapter: hardware → multiplexer)
// ───────────────────────────────────────────────────────────────

/// Capabilities the multiplexer needs from a GPIO controller.
///
/// All methods take `&self`: one stream keeps several waits in flight at
/// once, so implementations carry their own interior mutability.
///
/// Every asynchronous method receives the stream's cancellation token and
/// must resolve promptly once it fires, otherwise the stream cannot
/// terminate.
#[allow(async_fn_in_trait)]
pub trait PinController {
    /// Configure `pin` as an input with `mode`.
    ///
    /// Fails with [`HardwareFault::ModeConflict`] if the pin is already
    /// open under a different mode.
    fn open_for_input(&self, pin: i32, mode: PinMode) -> Result<(), HardwareFault>;

    /// Resolve once when a transition matching `edge` is seen on `pin`.
    ///
    /// On cancellation resolves with [`WaitResult::timed_out`].
    async fn wait_for_edge(
        &self,
        pin: i32,
        edge: EdgeType,
        cancel: CancellationToken,
    ) -> Result<WaitResult, HardwareFault>;

    /// Sleep for `duration`, or until `cancel` fires.
    async fn delay(&self, duration: Duration, cancel: CancellationToken) {
        cancellable_sleep(duration, cancel).await;
    }

    /// Monotonic time source used for clock deltas.
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// `embassy_time` timer raced against `cancel`.  Returns `true` when the
/// full duration elapsed.
///
/// Durations past the timer's range saturate to a deadline that never
/// arrives.
pub async fn cancellable_sleep(duration: Duration, cancel: CancellationToken) -> bool {
    let timer = async {
        let deadline = embassy_time::Duration::try_from(duration)
            .ok()
            .and_then(|d| embassy_time::Instant::now().checked_add(d))
            .unwrap_or(embassy_time::Instant::MAX);
        embassy_time::Timer::at(deadline).await;
        true
    };
    let cancelled = async move {
        cancel.cancelled().await;
        false
    };
    futures_lite::future::or(cancelled, timer).await
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: multiplexer → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// Consumers forward every stream event through this port.  Adapters
/// decide where it goes (serial log, display, telemetry).
pub trait EventSink {
    fn emit(&mut self, event: &SubscriptionEvent);
}
