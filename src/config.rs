//! Stopwatch configuration parameters
//!
//! Tunables for the stopwatch application: clock rate and which button
//! pins are wired.  Loaded from JSON; every field has a default so a
//! partial file is valid.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::pins::{EdgeType, PinMode};
use crate::subscription::SubscriptionRegistry;

/// Stopwatch configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopwatchConfig {
    // --- Timing ---
    /// How often to emit clock events and refresh the elapsed time (milliseconds)
    pub clock_rate_ms: u64,

    // --- Buttons ---
    /// Mode every button pin is opened with
    pub button_pin_mode: PinMode,
    /// Pin of the reset button; `None` if not fitted
    pub reset_pin: Option<i32>,
    /// Pin of the pause/resume button; `None` if not fitted
    pub pause_pin: Option<i32>,
    /// Pin of the stop button; `None` if not fitted
    pub stop_pin: Option<i32>,
}

impl Default for StopwatchConfig {
    fn default() -> Self {
        Self {
            // Timing
            clock_rate_ms: 100, // 10 Hz refresh

            // Buttons (active-low with pull-up)
            button_pin_mode: PinMode::InputPullUp,
            reset_pin: Some(5),
            pause_pin: Some(6),
            stop_pin: Some(13),
        }
    }
}

impl StopwatchConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn clock_rate(&self) -> Duration {
        Duration::from_millis(self.clock_rate_ms)
    }

    /// Fitted buttons as pin numbers, in reset, pause, stop order.
    pub fn button_pins(&self) -> impl Iterator<Item = i32> {
        [self.reset_pin, self.pause_pin, self.stop_pin]
            .into_iter()
            .flatten()
    }

    /// Registry with the clock enabled and a rising-edge subscription per
    /// fitted button.
    ///
    /// Two buttons on the same pin, an output mode, or a zero clock rate
    /// are rejected.
    pub fn registry(&self) -> Result<SubscriptionRegistry, ValidationError> {
        let mut registry = SubscriptionRegistry::new();
        registry
            .set_clock_enabled(true)
            .set_clock_rate(self.clock_rate())?;
        for pin in self.button_pins() {
            registry.subscribe(pin, self.button_pin_mode, EdgeType::Rising)?;
        }
        Ok(registry)
    }
}
