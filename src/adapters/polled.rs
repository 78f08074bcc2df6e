//! Level-polling pin controller over `embedded-hal` input pins.
//!
//! Adapts any [`embedded_hal::digital::InputPin`] into a [`PinController`]
//! for boards whose HAL offers no edge interrupts.  Each wait samples the
//! pin every `poll_interval` (reactor-driven `embassy_time` timer, not a
//! busy spin) and classifies level changes:
//!
//! | previous | current | observed  |
//! |----------|---------|-----------|
//! | low      | high    | `Rising`  |
//! | high     | low     | `Falling` |
//!
//! Nothing is latched.  A pulse shorter than the poll interval, or a
//! transition that lands between a wait resolving and its replacement
//! taking its first sample, goes unseen.
//!
//! Pins are created lazily by a caller-supplied factory on
//! `open_for_input`, which is where the HAL-specific pull configuration
//! happens.

use core::cell::RefCell;
use core::time::Duration;
use std::collections::HashMap;

use embedded_hal::digital::InputPin;
use log::{debug, warn};
use tokio_util::sync::CancellationToken;

use crate::app::ports::{PinController, cancellable_sleep};
use crate::error::HardwareFault;
use crate::pins::{EdgeType, PinMode, WaitResult};

/// Sampling period used by [`PolledPinController::new`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

struct PolledPin<P> {
    mode: PinMode,
    io: P,
}

/// [`PinController`] that detects edges by sampling input levels.
pub struct PolledPinController<P, F> {
    factory: RefCell<F>,
    pins: RefCell<HashMap<i32, PolledPin<P>>>,
    poll_interval: Duration,
}

impl<P, F> PolledPinController<P, F>
where
    P: InputPin,
    F: FnMut(i32, PinMode) -> Result<P, HardwareFault>,
{
    /// `factory` turns a pin number and mode into a configured input.
    pub fn new(factory: F) -> Self {
        Self {
            factory: RefCell::new(factory),
            pins: RefCell::new(HashMap::new()),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    fn sample(&self, pin: i32) -> Result<bool, HardwareFault> {
        let mut pins = self.pins.borrow_mut();
        let open = pins.get_mut(&pin).ok_or(HardwareFault::NotOpen { pin })?;
        open.io.is_high().map_err(|e| {
            warn!("pin {} read failed: {:?}", pin, embedded_hal::digital::Error::kind(&e));
            HardwareFault::WaitFailed { pin }
        })
    }
}

impl<P, F> PinController for PolledPinController<P, F>
where
    P: InputPin,
    F: FnMut(i32, PinMode) -> Result<P, HardwareFault>,
{
    fn open_for_input(&self, pin: i32, mode: PinMode) -> Result<(), HardwareFault> {
        if let Some(open_as) = self.pins.borrow().get(&pin).map(|p| p.mode) {
            return if open_as == mode {
                Ok(())
            } else {
                Err(HardwareFault::ModeConflict {
                    pin,
                    open_as,
                    requested: mode,
                })
            };
        }
        if !mode.is_input() {
            return Err(HardwareFault::OpenFailed { pin });
        }

        let mut factory = self.factory.borrow_mut();
        let io = (*factory)(pin, mode)?;
        self.pins.borrow_mut().insert(pin, PolledPin { mode, io });
        debug!("polled: pin {} open as {:?}", pin, mode);
        Ok(())
    }

    async fn wait_for_edge(
        &self,
        pin: i32,
        edge: EdgeType,
        cancel: CancellationToken,
    ) -> Result<WaitResult, HardwareFault> {
        let mut level = self.sample(pin)?;
        loop {
            if !cancellable_sleep(self.poll_interval, cancel.clone()).await {
                return Ok(WaitResult::timed_out());
            }

            let current = self.sample(pin)?;
            let observed = match (level, current) {
                (false, true) => Some(EdgeType::Rising),
                (true, false) => Some(EdgeType::Falling),
                _ => None,
            };
            level = current;

            if let Some(observed) = observed.filter(|&o| edge.matches(o)) {
                return Ok(WaitResult::edge(observed));
            }
        }
    }
}
