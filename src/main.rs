//! Stopwatch demo — host entry point.
//!
//! Runs the stopwatch against a real-time simulated controller while a
//! scripted "operator" presses the configured buttons.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  edge_executor::LocalExecutor                              │
//! │  ┌──────────────────┐      trigger()     ┌──────────────┐  │
//! │  │ press_script     │ ─────────────────▶ │ SimPin-      │  │
//! │  │ (button presses) │                    │ Controller   │  │
//! │  └──────────────────┘                    └──────┬───────┘  │
//! │  ┌──────────────────────────────────────────────▼───────┐  │
//! │  │ stopwatch::run ◀── EventStream ◀── SubscriptionService│  │
//! │  └──────────────────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `stopwatch [config.json]`.  Log level via `RUST_LOG`.

use core::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use pinsub::CancellationToken;
use pinsub::adapters::log_sink::LogEventSink;
use pinsub::adapters::sim::SimPinController;
use pinsub::app::ports::cancellable_sleep;
use pinsub::app::stopwatch::{self, Stopwatch, format_elapsed};
use pinsub::config::StopwatchConfig;
use pinsub::pins::EdgeType;

/// Simulated operator: run, pause, resume, reset, run, stop.
async fn press_script(
    controller: &SimPinController,
    config: &StopwatchConfig,
    cancel: CancellationToken,
) {
    let steps = [
        (Duration::from_millis(1500), config.pause_pin, "pause"),
        (Duration::from_millis(1000), config.pause_pin, "resume"),
        (Duration::from_millis(1000), config.reset_pin, "reset"),
        (Duration::from_millis(800), config.stop_pin, "stop"),
    ];

    for (wait, pin, label) in steps {
        if !cancellable_sleep(wait, cancel.clone()).await {
            return;
        }
        match pin {
            Some(pin) => {
                info!("operator: {} (pin {})", label, pin);
                controller.trigger(pin, EdgeType::Rising);
            }
            None => warn!("operator: no {} button fitted", label),
        }
    }

    // Without a stop button the script ends the run itself.
    if config.stop_pin.is_none() {
        cancel.cancel();
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("stopwatch demo v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Config (file or defaults) ──────────────────────────
    let config = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            StopwatchConfig::from_json(&text).with_context(|| format!("parsing config {path}"))?
        }
        None => {
            info!("no config path given, using defaults");
            StopwatchConfig::default()
        }
    };

    // ── 2. Subscriptions ──────────────────────────────────────
    let service = config
        .registry()
        .context("invalid button configuration")?
        .build();

    // ── 3. Run ────────────────────────────────────────────────
    let controller = SimPinController::realtime();
    let cancel = CancellationToken::new();
    let mut stopwatch = Stopwatch::new(&config);
    let mut sink = LogEventSink::new();

    let executor: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();
    executor
        .spawn(press_script(&controller, &config, cancel.clone()))
        .detach();

    let elapsed = futures_lite::future::block_on(executor.run(stopwatch::run(
        &service,
        &controller,
        cancel,
        &mut stopwatch,
        &mut sink,
    )))?;

    info!(
        "final time {} after {} events",
        format_elapsed(elapsed),
        sink.emitted()
    );
    Ok(())
}
