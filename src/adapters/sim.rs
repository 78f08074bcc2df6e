//! In-memory pin controller.
//!
//! Backs tests and the host demo.  Each opened pin gets one bounded edge
//! queue per filter (`Rising`, `Falling`, `Both`); [`SimPinController::trigger`]
//! pushes an observed edge into every queue whose filter matches, so the
//! simulated hardware latches edges until a wait consumes them.
//!
//! Time is either **virtual** ([`SimPinController::new`]): `delay()` fixes
//! its deadline on the first poll and completes on the next one, moving
//! the virtual clock forward to that deadline if it is not already past
//! it, which makes clock sequences fully deterministic; or
//! **real** ([`SimPinController::realtime`]): `delay()` uses the embassy
//! timer and `now()` reads the system monotonic clock.

use core::cell::{Cell, RefCell};
use core::time::Duration;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Instant;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;
use log::debug;
use tokio_util::sync::CancellationToken;

use crate::app::ports::{PinController, cancellable_sleep};
use crate::error::HardwareFault;
use crate::pins::{EdgeType, PinMode, WaitResult};

/// Latched edges per (pin, filter) before new ones are dropped.
const EDGE_QUEUE_DEPTH: usize = 16;

type EdgeQueue = Channel<NoopRawMutex, Result<EdgeType, HardwareFault>, EDGE_QUEUE_DEPTH>;

const FILTERS: [EdgeType; 3] = [EdgeType::Rising, EdgeType::Falling, EdgeType::Both];

struct PinQueues {
    rising: Rc<EdgeQueue>,
    falling: Rc<EdgeQueue>,
    both: Rc<EdgeQueue>,
}

impl PinQueues {
    fn new() -> Self {
        Self {
            rising: Rc::new(Channel::new()),
            falling: Rc::new(Channel::new()),
            both: Rc::new(Channel::new()),
        }
    }

    fn filter(&self, edge: EdgeType) -> &Rc<EdgeQueue> {
        match edge {
            EdgeType::Rising => &self.rising,
            EdgeType::Falling => &self.falling,
            EdgeType::Both => &self.both,
        }
    }
}

/// Simulated GPIO controller.
pub struct SimPinController {
    origin: Instant,
    /// `Some` in virtual-time mode.
    virtual_elapsed: Option<Cell<Duration>>,
    open: RefCell<HashMap<i32, PinMode>>,
    queues: RefCell<HashMap<i32, PinQueues>>,
    broken_pins: RefCell<Vec<i32>>,
    open_calls: Cell<usize>,
}

impl Default for SimPinController {
    fn default() -> Self {
        Self::new()
    }
}

impl SimPinController {
    /// Controller running on virtual time.
    pub fn new() -> Self {
        Self::with_time(Some(Cell::new(Duration::ZERO)))
    }

    /// Controller running on the real monotonic clock.
    pub fn realtime() -> Self {
        Self::with_time(None)
    }

    fn with_time(virtual_elapsed: Option<Cell<Duration>>) -> Self {
        Self {
            origin: Instant::now(),
            virtual_elapsed,
            open: RefCell::new(HashMap::new()),
            queues: RefCell::new(HashMap::new()),
            broken_pins: RefCell::new(Vec::new()),
            open_calls: Cell::new(0),
        }
    }

    /// Time since construction (virtual or real).
    pub fn elapsed(&self) -> Duration {
        self.now().saturating_duration_since(self.origin)
    }

    /// Move virtual time forward.  No-op on a real-time controller.
    pub fn advance(&self, by: Duration) {
        if let Some(elapsed) = &self.virtual_elapsed {
            elapsed.set(elapsed.get() + by);
        }
    }

    /// Latch an observed transition on `pin`.
    pub fn trigger(&self, pin: i32, observed: EdgeType) {
        let mut queues = self.queues.borrow_mut();
        let pin_queues = queues.entry(pin).or_insert_with(PinQueues::new);
        for filter in FILTERS {
            if filter.matches(observed)
                && pin_queues.filter(filter).try_send(Ok(observed)).is_err()
            {
                debug!("sim: pin {} {:?} queue full, edge dropped", pin, filter);
            }
        }
    }

    /// Fail the next wait on `pin` for each edge filter.
    pub fn inject_fault(&self, pin: i32) {
        let fault = HardwareFault::WaitFailed { pin };
        let mut queues = self.queues.borrow_mut();
        let pin_queues = queues.entry(pin).or_insert_with(PinQueues::new);
        for filter in FILTERS {
            if pin_queues.filter(filter).try_send(Err(fault)).is_err() {
                debug!("sim: pin {} {:?} queue full, fault dropped", pin, filter);
            }
        }
    }

    /// Make the next `open_for_input(pin, ..)` fail.
    pub fn break_pin(&self, pin: i32) {
        self.broken_pins.borrow_mut().push(pin);
    }

    /// Mode `pin` is currently open with.
    pub fn open_mode(&self, pin: i32) -> Option<PinMode> {
        self.open.borrow().get(&pin).copied()
    }

    /// Number of successful `open_for_input` calls.
    pub fn open_calls(&self) -> usize {
        self.open_calls.get()
    }

    fn queue(&self, pin: i32, edge: EdgeType) -> Rc<EdgeQueue> {
        let mut queues = self.queues.borrow_mut();
        let pin_queues = queues.entry(pin).or_insert_with(PinQueues::new);
        Rc::clone(pin_queues.filter(edge))
    }
}

impl PinController for SimPinController {
    fn open_for_input(&self, pin: i32, mode: PinMode) -> Result<(), HardwareFault> {
        let broken = self.broken_pins.borrow().iter().position(|&p| p == pin);
        if let Some(at) = broken {
            self.broken_pins.borrow_mut().remove(at);
            return Err(HardwareFault::OpenFailed { pin });
        }

        let mut open = self.open.borrow_mut();
        match open.get(&pin) {
            Some(&open_as) if open_as != mode => Err(HardwareFault::ModeConflict {
                pin,
                open_as,
                requested: mode,
            }),
            Some(_) => Ok(()),
            None => {
                open.insert(pin, mode);
                self.open_calls.set(self.open_calls.get() + 1);
                debug!("sim: pin {} open as {:?}", pin, mode);
                Ok(())
            }
        }
    }

    async fn wait_for_edge(
        &self,
        pin: i32,
        edge: EdgeType,
        cancel: CancellationToken,
    ) -> Result<WaitResult, HardwareFault> {
        if self.open_mode(pin).is_none() {
            return Err(HardwareFault::NotOpen { pin });
        }

        let queue = self.queue(pin, edge);
        let observed = async { queue.receive().await.map(WaitResult::edge) };
        let cancelled = async {
            cancel.cancelled().await;
            Ok::<_, HardwareFault>(WaitResult::timed_out())
        };
        futures_lite::future::or(cancelled, observed).await
    }

    async fn delay(&self, duration: Duration, cancel: CancellationToken) {
        match &self.virtual_elapsed {
            Some(elapsed) => {
                let deadline = elapsed.get() + duration;
                futures_lite::future::yield_now().await;
                if !cancel.is_cancelled() {
                    elapsed.set(elapsed.get().max(deadline));
                }
            }
            None => {
                cancellable_sleep(duration, cancel).await;
            }
        }
    }

    fn now(&self) -> Instant {
        match &self.virtual_elapsed {
            Some(elapsed) => self.origin + elapsed.get(),
            None => Instant::now(),
        }
    }
}
