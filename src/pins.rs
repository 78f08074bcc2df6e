//! GPIO vocabulary shared by subscriptions, controllers, and events.
//!
//! Pin numbers are plain `i32` values as handed to the controller; how a
//! number maps onto a physical pad is the controller's business.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Pin configuration
// ---------------------------------------------------------------------------

/// Electrical configuration a pin is opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinMode {
    /// Floating input.
    Input,
    /// Input with the internal pull-up enabled (active-low buttons).
    InputPullUp,
    /// Input with the internal pull-down enabled.
    InputPullDown,
    /// Push-pull output.  Never valid for a subscription.
    Output,
}

impl PinMode {
    pub const fn is_input(self) -> bool {
        !matches!(self, Self::Output)
    }
}

// ---------------------------------------------------------------------------
// Edges
// ---------------------------------------------------------------------------

/// Transition kind a subscription listens for, or that a wait observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    /// Low → high.
    Rising,
    /// High → low.
    Falling,
    /// Either direction.
    Both,
}

impl EdgeType {
    /// Whether an observed transition satisfies this filter.
    pub const fn matches(self, observed: EdgeType) -> bool {
        match self {
            Self::Both => true,
            Self::Rising => matches!(observed, Self::Rising | Self::Both),
            Self::Falling => matches!(observed, Self::Falling | Self::Both),
        }
    }
}

// ---------------------------------------------------------------------------
// Wait outcome
// ---------------------------------------------------------------------------

/// Raw outcome of a single wait operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitResult {
    /// Edge the controller observed, `None` when the wait ended without one.
    pub edge: Option<EdgeType>,
    /// Set when the wait ended because time ran out (clock ticks) or the
    /// wait was cancelled.
    pub timed_out: bool,
}

impl WaitResult {
    /// An observed edge.
    pub const fn edge(edge: EdgeType) -> Self {
        Self {
            edge: Some(edge),
            timed_out: false,
        }
    }

    /// A wait that ended without an edge.
    pub const fn timed_out() -> Self {
        Self {
            edge: None,
            timed_out: true,
        }
    }
}
