//! Subscription service — the event multiplexer.
//!
//! [`SubscriptionService::run`] turns a frozen set of subscriptions into a
//! single ordered [`Stream`] of [`SubscriptionEvent`]s.  Internally it keeps
//! a wait pool: one slot per (pin, edge) subscription plus an optional clock
//! slot, each holding exactly one in-flight wait.
//!
//! ```text
//!  slot 0: wait_for_edge(17, Rising)  ─┐
//!  slot 1: wait_for_edge(17, Falling) ─┼─▶ first ready ─▶ re-arm slot ─▶ emit
//!  slot 2: delay(clock_rate)          ─┘
//! ```
//!
//! ## Ordering
//!
//! Exactly one event is produced per `poll_next`, so the output order is
//! the completion order of the underlying waits.  When several slots are
//! ready in the same poll the scan starts one past the last slot that
//! fired; callers must not rely on any particular tie-break.
//!
//! ## Re-arm window
//!
//! A slot is re-armed before its event is returned: the replacement wait
//! is installed and polled once, so it is already listening (and a clock
//! timer already running) while the consumer handles the event.  If that
//! first poll completes the wait, the outcome is parked in the slot and
//! delivered by a later `poll_next`.  A controller that does not latch
//! edges can still miss a transition in the short span between a wait
//! completing and its replacement's first poll.
//!
//! ## Termination
//!
//! - Cancellation ends the stream (`None`).  It is checked once per poll,
//!   and again after a wait resolves so nothing is emitted once the token
//!   has fired.
//! - A [`HardwareFault`] from opening or waiting is yielded once as
//!   `Some(Err(_))`; the stream is finished afterwards.
//!
//! Pins are never closed by the service.

use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};
use core::time::Duration;
use std::time::Instant;

use futures_lite::Stream;
use log::{debug, info, warn};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

use super::Subscription;
use super::event::{EventSource, SubscriptionEvent};
use crate::app::ports::PinController;
use crate::error::HardwareFault;
use crate::pins::WaitResult;

type PendingWait<'a> = Pin<Box<dyn Future<Output = Result<WaitResult, HardwareFault>> + 'a>>;

// ───────────────────────────────────────────────────────────────
// SubscriptionService
// ───────────────────────────────────────────────────────────────

/// Immutable snapshot produced by
/// [`SubscriptionRegistry::build`](super::SubscriptionRegistry::build).
#[derive(Debug, Clone)]
pub struct SubscriptionService {
    subscriptions: Vec<Subscription>,
    clock_rate: Duration,
    clock_enabled: bool,
}

impl SubscriptionService {
    pub(crate) fn new(
        subscriptions: Vec<Subscription>,
        clock_rate: Duration,
        clock_enabled: bool,
    ) -> Self {
        Self {
            subscriptions,
            clock_rate,
            clock_enabled,
        }
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    pub fn clock_rate(&self) -> Duration {
        self.clock_rate
    }

    pub fn clock_enabled(&self) -> bool {
        self.clock_enabled
    }

    /// Start listening.  Lazy: the controller is not touched until the
    /// returned stream is first polled.
    ///
    /// The controller is treated as exclusively owned by the stream.  Two
    /// concurrent streams opening the same pins on one controller are not
    /// supported.
    pub fn run<'a, C: PinController>(
        &'a self,
        controller: &'a C,
        cancel: CancellationToken,
    ) -> EventStream<'a, C> {
        EventStream {
            service: self,
            controller,
            cancelled: Box::pin(cancel.clone().cancelled_owned()),
            cancel,
            state: StreamState::Idle,
        }
    }

    /// Open each distinct pin once, then arm every slot.
    fn open_pool<'a, C: PinController>(
        &'a self,
        controller: &'a C,
        cancel: &CancellationToken,
    ) -> Result<WaitPool<'a>, HardwareFault> {
        let mut opened: Vec<i32> = Vec::new();
        for sub in &self.subscriptions {
            if opened.contains(&sub.pin()) {
                continue;
            }
            controller.open_for_input(sub.pin(), sub.mode())?;
            info!("pin {} opened as {:?}", sub.pin(), sub.mode());
            opened.push(sub.pin());
        }

        let slots: Vec<Slot<'a>> = self
            .subscriptions
            .iter()
            .map(|sub| EventSource::Pin {
                pin: sub.pin(),
                edge: sub.edge(),
            })
            .chain(self.clock_enabled.then_some(EventSource::Clock))
            .map(|source| Slot {
                source,
                pending: arm(controller, source, self.clock_rate, cancel),
                ready: None,
            })
            .collect();

        info!(
            "wait pool armed: {} slot(s), clock {}",
            slots.len(),
            if self.clock_enabled { "on" } else { "off" }
        );

        Ok(WaitPool {
            slots,
            last_clock: controller.now(),
            next_start: 0,
        })
    }
}

/// Issue a fresh wait for `source`.
fn arm<'a, C: PinController>(
    controller: &'a C,
    source: EventSource,
    clock_rate: Duration,
    cancel: &CancellationToken,
) -> PendingWait<'a> {
    let cancel = cancel.clone();
    match source {
        EventSource::Pin { pin, edge } => Box::pin(controller.wait_for_edge(pin, edge, cancel)),
        EventSource::Clock => Box::pin(async move {
            controller.delay(clock_rate, cancel).await;
            Ok::<_, HardwareFault>(WaitResult::timed_out())
        }),
    }
}

// ───────────────────────────────────────────────────────────────
// Wait pool
// ───────────────────────────────────────────────────────────────

struct Slot<'a> {
    source: EventSource,
    pending: PendingWait<'a>,
    /// Outcome of a replacement wait that completed on its first poll,
    /// with the time it completed.
    ready: Option<(Result<WaitResult, HardwareFault>, Instant)>,
}

struct WaitPool<'a> {
    slots: Vec<Slot<'a>>,
    last_clock: Instant,
    /// Scan origin for the next poll.
    next_start: usize,
}

impl<'a> WaitPool<'a> {
    /// Poll every slot once, starting at `next_start`.
    ///
    /// `Ready(None)` means a wait resolved after the token fired.
    fn poll_slots<C: PinController>(
        &mut self,
        controller: &'a C,
        clock_rate: Duration,
        cancel: &CancellationToken,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<SubscriptionEvent, HardwareFault>>> {
        let count = self.slots.len();
        for offset in 0..count {
            let index = (self.next_start + offset) % count;
            let slot = &mut self.slots[index];

            let (outcome, completed_at) = match slot.ready.take() {
                Some(parked) => parked,
                None => match slot.pending.as_mut().poll(cx) {
                    Poll::Ready(outcome) => (outcome, controller.now()),
                    Poll::Pending => continue,
                },
            };
            self.next_start = (index + 1) % count;

            let result = match outcome {
                Ok(result) => result,
                Err(fault) => return Poll::Ready(Some(Err(fault))),
            };

            if cancel.is_cancelled() {
                return Poll::Ready(None);
            }

            let delta = match slot.source {
                EventSource::Pin { .. } => Duration::ZERO,
                EventSource::Clock => {
                    let delta = completed_at.saturating_duration_since(self.last_clock);
                    self.last_clock = completed_at;
                    delta
                }
            };

            // Start the replacement now so it runs while the consumer works.
            slot.pending = arm(controller, slot.source, clock_rate, cancel);
            if let Poll::Ready(outcome) = slot.pending.as_mut().poll(cx) {
                slot.ready = Some((outcome, controller.now()));
            }

            debug!("slot {} fired: {:?} delta={:?}", index, slot.source, delta);
            return Poll::Ready(Some(Ok(SubscriptionEvent::new(
                slot.source,
                result,
                delta,
            ))));
        }
        Poll::Pending
    }
}

// ───────────────────────────────────────────────────────────────
// EventStream
// ───────────────────────────────────────────────────────────────

enum StreamState<'a> {
    /// Not polled yet; no pins opened.
    Idle,
    Running(WaitPool<'a>),
    Finished,
}

/// Lazy, ordered, cancellable stream returned by [`SubscriptionService::run`].
pub struct EventStream<'a, C> {
    service: &'a SubscriptionService,
    controller: &'a C,
    cancel: CancellationToken,
    /// Wakes the stream when the token fires, even if no wait notices.
    cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
    state: StreamState<'a>,
}

impl<C> EventStream<'_, C> {
    /// Whether the stream has ended (cancelled or faulted).
    pub fn is_finished(&self) -> bool {
        matches!(self.state, StreamState::Finished)
    }

    fn finish(&mut self) {
        // Dropping the pool abandons every outstanding wait.
        self.state = StreamState::Finished;
    }
}

impl<'a, C: PinController> Stream for EventStream<'a, C> {
    type Item = Result<SubscriptionEvent, HardwareFault>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.is_finished() {
            return Poll::Ready(None);
        }

        if this.cancel.is_cancelled() || this.cancelled.as_mut().poll(cx).is_ready() {
            info!("subscription stream cancelled");
            this.finish();
            return Poll::Ready(None);
        }

        if let StreamState::Idle = this.state {
            match this.service.open_pool(this.controller, &this.cancel) {
                Ok(pool) => this.state = StreamState::Running(pool),
                Err(fault) => {
                    warn!("subscription setup failed: {}", fault);
                    this.finish();
                    return Poll::Ready(Some(Err(fault)));
                }
            }
        }

        let StreamState::Running(pool) = &mut this.state else {
            return Poll::Ready(None);
        };

        match pool.poll_slots(this.controller, this.service.clock_rate, &this.cancel, cx) {
            Poll::Ready(Some(Ok(event))) => Poll::Ready(Some(Ok(event))),
            Poll::Ready(Some(Err(fault))) => {
                warn!("subscription stream fault: {}", fault);
                this.finish();
                Poll::Ready(Some(Err(fault)))
            }
            Poll::Ready(None) => {
                info!("subscription stream cancelled");
                this.finish();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
