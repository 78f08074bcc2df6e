//! pinsub — pin-edge and clock subscription multiplexer.
//!
//! Register interest in GPIO edges with a [`SubscriptionRegistry`], freeze
//! it with [`SubscriptionRegistry::build`], then consume the merged,
//! time-ordered event stream from [`SubscriptionService::run`].  Hardware
//! is reached only through the [`PinController`] port.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod pins;
pub mod subscription;

pub use app::ports::{EventSink, PinController};
pub use error::{Error, HardwareFault, Result, ValidationError};
pub use pins::{EdgeType, PinMode, WaitResult};
pub use subscription::{
    EventSource, EventStream, Subscription, SubscriptionEvent, SubscriptionRegistry,
    SubscriptionService,
};
pub use tokio_util::sync::CancellationToken;
