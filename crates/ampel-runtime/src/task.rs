//! Periodic task seam
//!
//! The coordinator does not own a thread or inherit from a host scheduler
//! class; anything tickable implements this one-method trait and an external
//! scheduler calls it at the returned cadence.

use std::time::Duration;

use ampel_core::Millis;

/// One cooperative, non-blocking unit of periodic work
pub trait PeriodicTask {
    /// Run one tick at `now`; returns the desired time until the next tick
    fn tick(&mut self, now: Millis) -> Duration;
}
