//! Pin-edge subscriptions and the multiplexer that serves them.
//!
//! ```text
//!  subscribe()/unsubscribe()        build()              run(&controller, cancel)
//! ┌──────────────────────┐  ────▶ ┌─────────────────────┐ ────▶ EventStream
//! │ SubscriptionRegistry │        │ SubscriptionService │       (Pin | Clock events)
//! │ (mutable builder)    │        │ (frozen snapshot)   │
//! └──────────────────────┘        └─────────────────────┘
//! ```

pub mod event;
pub mod registry;
pub mod service;

pub use event::{EventSource, SubscriptionEvent};
pub use registry::{DEFAULT_CLOCK_RATE, SubscriptionRegistry};
pub use service::{EventStream, SubscriptionService};

use crate::error::ValidationError;
use crate::pins::{EdgeType, PinMode};

/// One validated (pin, mode, edge) registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    pin: i32,
    mode: PinMode,
    edge: EdgeType,
}

impl Subscription {
    /// Validate and construct a subscription.
    ///
    /// Rejects negative pin numbers and [`PinMode::Output`].
    pub fn new(pin: i32, mode: PinMode, edge: EdgeType) -> Result<Self, ValidationError> {
        if pin < 0 {
            return Err(ValidationError::InvalidPinNumber(pin));
        }
        if !mode.is_input() {
            return Err(ValidationError::OutputMode { pin });
        }
        Ok(Self { pin, mode, edge })
    }

    pub fn pin(&self) -> i32 {
        self.pin
    }

    pub fn mode(&self) -> PinMode {
        self.mode
    }

    pub fn edge(&self) -> EdgeType {
        self.edge
    }
}
