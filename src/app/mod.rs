//! Application layer — ports and the stopwatch consumer.
//!
//! The multiplexer in [`crate::subscription`] reaches hardware only
//! through the **port traits** in [`ports`]; [`stopwatch`] is the pure
//! consumer logic built on top of the event stream.

pub mod ports;
pub mod stopwatch;
