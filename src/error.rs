//! Unified error types for the subscription multiplexer.
//!
//! A single `Error` enum that both failure domains convert into: registry
//! validation (raised synchronously while subscriptions are being edited)
//! and hardware faults (surfaced as the terminal item of an event stream).
//! All variants are `Copy` so they pass through the stream without
//! allocation.
//!
//! Cancellation is deliberately absent: a cancelled stream simply ends.

use core::fmt;

use crate::pins::{EdgeType, PinMode};

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A subscription or registry edit was rejected.
    Validation(ValidationError),
    /// The pin controller reported a failure.
    Hardware(HardwareFault),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "validation: {e}"),
            Self::Hardware(e) => write!(f, "hardware: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Hardware(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation errors
// ---------------------------------------------------------------------------

/// Rejected registry mutation.  Never produced once a service is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Pin numbers must be non-negative.
    InvalidPinNumber(i32),
    /// Output pins cannot be subscribed to edge events.
    OutputMode { pin: i32 },
    /// The (pin, edge) pair is already registered.
    Duplicate { pin: i32, edge: EdgeType },
    /// The pin is already registered under a different mode.
    ConflictingMode {
        pin: i32,
        registered: PinMode,
        requested: PinMode,
    },
    /// No subscription exists for the (pin, edge) pair.
    NotFound { pin: i32, edge: EdgeType },
    /// Clock rate must be strictly positive.
    InvalidClockRate,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPinNumber(pin) => {
                write!(f, "pin number must be non-negative, got {pin}")
            }
            Self::OutputMode { pin } => write!(
                f,
                "pin {pin}: output pins cannot be subscribed to edge events"
            ),
            Self::Duplicate { pin, edge } => {
                write!(f, "subscription already exists for pin {pin}:{edge:?}")
            }
            Self::ConflictingMode {
                pin,
                registered,
                requested,
            } => write!(
                f,
                "conflicting modes for pin {pin}: registered {registered:?}, requested {requested:?}"
            ),
            Self::NotFound { pin, edge } => {
                write!(f, "no subscription exists for pin {pin}:{edge:?}")
            }
            Self::InvalidClockRate => write!(f, "clock rate must be greater than zero"),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

// ---------------------------------------------------------------------------
// Hardware faults
// ---------------------------------------------------------------------------

/// Failure reported by a [`PinController`](crate::app::ports::PinController).
///
/// Terminal for the event stream that observes it: the stream yields the
/// fault once and then ends.  Nothing retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareFault {
    /// The controller could not open the pin for input.
    OpenFailed { pin: i32 },
    /// The pin is already open under another mode.
    ModeConflict {
        pin: i32,
        open_as: PinMode,
        requested: PinMode,
    },
    /// A wait was issued for a pin that was never opened.
    NotOpen { pin: i32 },
    /// The edge wait itself failed (read error, driver fault).
    WaitFailed { pin: i32 },
}

impl HardwareFault {
    /// Pin the fault concerns.
    pub const fn pin(&self) -> i32 {
        match *self {
            Self::OpenFailed { pin }
            | Self::ModeConflict { pin, .. }
            | Self::NotOpen { pin }
            | Self::WaitFailed { pin } => pin,
        }
    }
}

impl fmt::Display for HardwareFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenFailed { pin } => write!(f, "pin {pin}: open failed"),
            Self::ModeConflict {
                pin,
                open_as,
                requested,
            } => write!(
                f,
                "pin {pin}: already open as {open_as:?}, cannot reopen as {requested:?}"
            ),
            Self::NotOpen { pin } => write!(f, "pin {pin}: not open"),
            Self::WaitFailed { pin } => write!(f, "pin {pin}: edge wait failed"),
        }
    }
}

impl std::error::Error for HardwareFault {}

impl From<HardwareFault> for Error {
    fn from(e: HardwareFault) -> Self {
        Self::Hardware(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
