//! Integration tests for the stopwatch consumer driven end to end by the
//! subscription service on a virtual-time simulated controller.

use core::time::Duration;

use futures_lite::future::block_on;

use crate::mock_hw::{OperatorSink, RecordingSink};
use pinsub::adapters::sim::SimPinController;
use pinsub::app::stopwatch::{self, Stopwatch};
use pinsub::config::StopwatchConfig;
use pinsub::{CancellationToken, Error, HardwareFault};

const RESET: i32 = 5;
const PAUSE: i32 = 6;
const STOP: i32 = 13;

fn config() -> StopwatchConfig {
    StopwatchConfig {
        clock_rate_ms: 100,
        reset_pin: Some(RESET),
        pause_pin: Some(PAUSE),
        stop_pin: Some(STOP),
        ..StopwatchConfig::default()
    }
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn stop_button_ends_run() {
    let config = config();
    let service = config.registry().unwrap().build();
    let sim = SimPinController::new();
    let cancel = CancellationToken::new();
    let mut sw = Stopwatch::new(&config);
    let mut sink = OperatorSink::new(&sim, &[(3, STOP)]);

    let elapsed = block_on(stopwatch::run(
        &service,
        &sim,
        cancel.clone(),
        &mut sw,
        &mut sink,
    ))
    .unwrap();

    // The press lands after tick 3; at most one more tick can win the race.
    assert!(elapsed >= ms(300) && elapsed <= ms(400), "{elapsed:?}");
    assert_eq!(sink.recorded.presses(STOP), 1);
    assert!(cancel.is_cancelled(), "stop must cancel outstanding waits");
}

#[test]
fn pause_freezes_elapsed_time() {
    let config = config();
    let service = config.registry().unwrap().build();
    let sim = SimPinController::new();
    let mut sw = Stopwatch::new(&config);
    let mut sink = OperatorSink::new(&sim, &[(2, PAUSE), (8, STOP)]);

    let elapsed = block_on(stopwatch::run(
        &service,
        &sim,
        CancellationToken::new(),
        &mut sw,
        &mut sink,
    ))
    .unwrap();

    assert!(sw.is_paused());
    assert!(elapsed >= ms(200) && elapsed <= ms(300), "{elapsed:?}");
    assert!(sink.recorded.clock_ticks() >= 8);
}

#[test]
fn reset_then_resume_counts_from_zero() {
    let config = config();
    let service = config.registry().unwrap().build();
    let sim = SimPinController::new();
    let mut sw = Stopwatch::new(&config);
    let mut sink = OperatorSink::new(&sim, &[(5, RESET), (10, STOP)]);

    let elapsed = block_on(stopwatch::run(
        &service,
        &sim,
        CancellationToken::new(),
        &mut sw,
        &mut sink,
    ))
    .unwrap();

    // Ticks 6..=10 (plus possibly one straggler each side of a press).
    assert!(elapsed >= ms(400) && elapsed <= ms(600), "{elapsed:?}");
    assert_eq!(sink.recorded.presses(RESET), 1);
}

#[test]
fn external_cancel_returns_elapsed_so_far() {
    let config = StopwatchConfig {
        stop_pin: None,
        ..config()
    };
    let service = config.registry().unwrap().build();
    let sim = SimPinController::new();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut sw = Stopwatch::new(&config);
    let mut sink = RecordingSink::new();

    let elapsed = block_on(stopwatch::run(&service, &sim, cancel, &mut sw, &mut sink)).unwrap();
    assert_eq!(elapsed, Duration::ZERO);
    assert!(sink.events.is_empty());
}

#[test]
fn hardware_fault_surfaces_as_error() {
    let config = config();
    let service = config.registry().unwrap().build();
    let sim = SimPinController::new();
    sim.break_pin(PAUSE);
    let mut sw = Stopwatch::new(&config);
    let mut sink = RecordingSink::new();

    let result = block_on(stopwatch::run(
        &service,
        &sim,
        CancellationToken::new(),
        &mut sw,
        &mut sink,
    ));
    assert_eq!(
        result.unwrap_err(),
        Error::Hardware(HardwareFault::OpenFailed { pin: PAUSE })
    );
    assert!(sink.events.is_empty());
}
