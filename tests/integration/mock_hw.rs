//! Shared test doubles for integration tests.
//!
//! Event sinks that record what the stopwatch consumer emitted, and one
//! that plays the operator by pressing simulated buttons when a given
//! clock tick is reached.

use pinsub::adapters::sim::SimPinController;
use pinsub::app::ports::EventSink;
use pinsub::pins::EdgeType;
use pinsub::subscription::SubscriptionEvent;

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<SubscriptionEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clock_ticks(&self) -> usize {
        self.events.iter().filter(|e| e.is_clock()).count()
    }

    pub fn presses(&self, pin: i32) -> usize {
        self.events.iter().filter(|e| e.pin() == Some(pin)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &SubscriptionEvent) {
        self.events.push(*event);
    }
}

// ── OperatorSink ──────────────────────────────────────────────

/// Presses `pin` once the `tick`-th clock event has been emitted.
pub struct OperatorSink<'a> {
    sim: &'a SimPinController,
    script: Vec<(usize, i32)>,
    ticks: usize,
    pub recorded: RecordingSink,
}

impl<'a> OperatorSink<'a> {
    pub fn new(sim: &'a SimPinController, script: &[(usize, i32)]) -> Self {
        Self {
            sim,
            script: script.to_vec(),
            ticks: 0,
            recorded: RecordingSink::new(),
        }
    }
}

impl EventSink for OperatorSink<'_> {
    fn emit(&mut self, event: &SubscriptionEvent) {
        self.recorded.emit(event);
        if !event.is_clock() {
            return;
        }
        self.ticks += 1;
        for &(tick, pin) in &self.script {
            if tick == self.ticks {
                self.sim.trigger(pin, EdgeType::Rising);
            }
        }
    }
}
