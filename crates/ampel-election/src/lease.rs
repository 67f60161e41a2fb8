//! Leadership lease
//!
//! A lease is the leader's time-bounded claim to authority. It is renewed
//! well before expiry so that a few lost beacons never cause a spurious
//! failover; the advertised remaining TTL rides in every beacon.

use ampel_core::Millis;

/// Leader-side lease record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lease {
    expiry: Millis,
    lease_ms: u32,
    renew_before_ms: u32,
}

impl Lease {
    /// Take out a fresh lease at `now`
    pub fn start(now: Millis, lease_ms: u32, renew_before_ms: u32) -> Self {
        Lease {
            expiry: now + lease_ms,
            lease_ms,
            renew_before_ms,
        }
    }

    /// Is it time to extend the lease?
    #[inline]
    pub fn renew_due(&self, now: Millis) -> bool {
        now.remaining_until(self.expiry) <= self.renew_before_ms
    }

    /// Extend the lease from `now`
    pub fn renew(&mut self, now: Millis) {
        self.expiry = now + self.lease_ms;
    }

    /// Remaining lease time, the beacon `lt` field
    #[inline]
    pub fn remaining_ms(&self, now: Millis) -> u32 {
        now.remaining_until(self.expiry)
    }

    #[inline]
    pub fn expired(&self, now: Millis) -> bool {
        now.has_reached(self.expiry)
    }
}
