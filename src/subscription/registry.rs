//! Mutable subscription registry.
//!
//! Enforces the registration invariants up front so a built
//! [`SubscriptionService`] is always internally consistent:
//!
//! - each (pin, edge) pair appears at most once;
//! - every subscription on a pin uses the same [`PinMode`];
//! - the clock rate is strictly positive.
//!
//! Edits are chainable: `registry.subscribe(..)?.subscribe(..)?`.

use core::time::Duration;

use log::debug;

use super::Subscription;
use super::service::SubscriptionService;
use crate::error::ValidationError;
use crate::pins::{EdgeType, PinMode};

/// Clock rate used until [`SubscriptionRegistry::set_clock_rate`] is called.
pub const DEFAULT_CLOCK_RATE: Duration = Duration::from_millis(500);

/// Builder collecting subscriptions and clock settings.
#[derive(Debug, Clone)]
pub struct SubscriptionRegistry {
    subscriptions: Vec<Subscription>,
    clock_enabled: bool,
    clock_rate: Duration,
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionRegistry {
    /// Empty registry, clock disabled, rate [`DEFAULT_CLOCK_RATE`].
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
            clock_enabled: false,
            clock_rate: DEFAULT_CLOCK_RATE,
        }
    }

    /// Register interest in `edge` transitions on `pin`.
    ///
    /// On error the registry is left untouched.
    pub fn subscribe(
        &mut self,
        pin: i32,
        mode: PinMode,
        edge: EdgeType,
    ) -> Result<&mut Self, ValidationError> {
        let subscription = Subscription::new(pin, mode, edge)?;

        if self.position(pin, edge).is_some() {
            return Err(ValidationError::Duplicate { pin, edge });
        }

        if let Some(existing) = self
            .subscriptions
            .iter()
            .find(|s| s.pin() == pin && s.mode() != mode)
        {
            return Err(ValidationError::ConflictingMode {
                pin,
                registered: existing.mode(),
                requested: mode,
            });
        }

        debug!("subscribe pin {} {:?} ({:?})", pin, edge, mode);
        self.subscriptions.push(subscription);
        Ok(self)
    }

    /// Remove the (pin, edge) registration.
    pub fn unsubscribe(&mut self, pin: i32, edge: EdgeType) -> Result<&mut Self, ValidationError> {
        let index = self
            .position(pin, edge)
            .ok_or(ValidationError::NotFound { pin, edge })?;
        debug!("unsubscribe pin {} {:?}", pin, edge);
        self.subscriptions.remove(index);
        Ok(self)
    }

    /// Enable or disable the periodic clock slot.
    pub fn set_clock_enabled(&mut self, enabled: bool) -> &mut Self {
        self.clock_enabled = enabled;
        self
    }

    /// Minimum interval between clock events.  Use the event delta for the
    /// time that actually elapsed.
    pub fn set_clock_rate(&mut self, rate: Duration) -> Result<&mut Self, ValidationError> {
        if rate.is_zero() {
            return Err(ValidationError::InvalidClockRate);
        }
        self.clock_rate = rate;
        Ok(self)
    }

    /// Registered subscriptions, in registration order.
    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    pub fn clock_enabled(&self) -> bool {
        self.clock_enabled
    }

    pub fn clock_rate(&self) -> Duration {
        self.clock_rate
    }

    /// Freeze the current state into a runnable service.
    ///
    /// The service owns a copy; editing the registry afterwards does not
    /// affect it.
    pub fn build(&self) -> SubscriptionService {
        SubscriptionService::new(
            self.subscriptions.clone(),
            self.clock_rate,
            self.clock_enabled,
        )
    }

    fn position(&self, pin: i32, edge: EdgeType) -> Option<usize> {
        self.subscriptions
            .iter()
            .position(|s| s.pin() == pin && s.edge() == edge)
    }
}
