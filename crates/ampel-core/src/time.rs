//! Monotonic millisecond time with wraparound-safe deadline arithmetic
//!
//! Timestamps are 32-bit milliseconds that wrap after ~49.7 days of uptime.
//! All deadline decisions therefore go through the signed difference of two
//! stamps, never through direct ordering of the raw values.

use std::fmt;
use std::ops::{Add, AddAssign};

/// Wrapping milliseconds since an arbitrary per-node epoch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Millis(pub u32);

impl Millis {
    pub const ZERO: Millis = Millis(0);

    #[inline]
    pub fn new(ms: u32) -> Self {
        Millis(ms)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Signed distance from `earlier` to `self`.
    ///
    /// Correct across wraparound as long as the true distance is under
    /// half the u32 range (~24.8 days), which every protocol interval is.
    #[inline]
    pub fn delta(self, earlier: Millis) -> i32 {
        self.0.wrapping_sub(earlier.0) as i32
    }

    /// Milliseconds elapsed since `earlier`, 0 if `earlier` is in the future
    #[inline]
    pub fn elapsed_since(self, earlier: Millis) -> u32 {
        let d = self.delta(earlier);
        if d < 0 {
            0
        } else {
            d as u32
        }
    }

    /// Has `deadline` been reached at time `self`?
    #[inline]
    pub fn has_reached(self, deadline: Millis) -> bool {
        self.delta(deadline) >= 0
    }

    /// Milliseconds still to run until `deadline`, 0 once reached
    #[inline]
    pub fn remaining_until(self, deadline: Millis) -> u32 {
        let d = deadline.delta(self);
        if d < 0 {
            0
        } else {
            d as u32
        }
    }
}

impl Add<u32> for Millis {
    type Output = Millis;

    #[inline]
    fn add(self, ms: u32) -> Millis {
        Millis(self.0.wrapping_add(ms))
    }
}

impl AddAssign<u32> for Millis {
    #[inline]
    fn add_assign(&mut self, ms: u32) {
        self.0 = self.0.wrapping_add(ms);
    }
}

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
