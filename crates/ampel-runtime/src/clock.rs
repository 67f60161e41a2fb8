//! Wall-clock to protocol-time bridge

use std::time::Instant;

use ampel_core::Millis;

/// Monotonic source of protocol `Millis`
///
/// Wraps `Instant` into the 32-bit wrapping millisecond domain the protocol
/// runs in. Each node has its own epoch; only elapsed differences matter.
#[derive(Clone, Copy, Debug)]
pub struct TickClock {
    epoch: Instant,
}

impl TickClock {
    pub fn start() -> Self {
        TickClock {
            epoch: Instant::now(),
        }
    }

    /// Current protocol time; truncation past ~49.7 days is handled by the
    /// wrapping arithmetic on `Millis`
    pub fn now(&self) -> Millis {
        Millis(self.epoch.elapsed().as_millis() as u32)
    }
}

impl Default for TickClock {
    fn default() -> Self {
        TickClock::start()
    }
}
