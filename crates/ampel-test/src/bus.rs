//! Simulated shared broadcast bus
//!
//! One seeded bus carries every node's frames with configurable loss,
//! duplication, corruption and delay, standing in for the RS-485 pair or
//! the wireless mesh. Endpoints implement the runtime `Transport` trait so
//! real `Node` shells run over it unchanged.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use ampel_core::Millis;
use ampel_runtime::Transport;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Bus fault model
#[derive(Clone, Copy, Debug)]
pub struct BusConfig {
    /// Per-receiver frame loss probability
    pub loss_rate: f64,
    /// Per-receiver duplication probability
    pub duplicate_prob: f64,
    /// Per-receiver single-byte corruption probability
    pub corrupt_prob: f64,
    /// Delivery delay range, inclusive
    pub min_delay_ms: u32,
    pub max_delay_ms: u32,
}

impl BusConfig {
    /// Perfect delivery on the next tick
    pub fn clean() -> Self {
        BusConfig {
            loss_rate: 0.0,
            duplicate_prob: 0.0,
            corrupt_prob: 0.0,
            min_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    /// Field-typical RS-485 with occasional collisions
    pub fn lossy() -> Self {
        BusConfig {
            loss_rate: 0.05,
            duplicate_prob: 0.01,
            corrupt_prob: 0.02,
            min_delay_ms: 0,
            max_delay_ms: 60,
        }
    }

    /// Degraded wireless link
    pub fn hostile() -> Self {
        BusConfig {
            loss_rate: 0.20,
            duplicate_prob: 0.05,
            corrupt_prob: 0.10,
            min_delay_ms: 10,
            max_delay_ms: 250,
        }
    }
}

/// Bus counters, cumulative
#[derive(Clone, Copy, Debug, Default)]
pub struct BusStats {
    pub frames_sent: u64,
    pub frames_delivered: u64,
    pub frames_lost: u64,
    pub frames_corrupted: u64,
    pub frames_duplicated: u64,
}

#[derive(Debug)]
struct InFlight {
    deliver_at: Millis,
    to: usize,
    data: Vec<u8>,
}

struct BusCore {
    config: BusConfig,
    rng: StdRng,
    mailboxes: Vec<VecDeque<Vec<u8>>>,
    in_flight: Vec<InFlight>,
    now: Millis,
    stats: BusStats,
}

impl BusCore {
    fn delay(&mut self) -> u32 {
        if self.config.max_delay_ms <= self.config.min_delay_ms {
            return self.config.min_delay_ms;
        }
        self.rng
            .gen_range(self.config.min_delay_ms..=self.config.max_delay_ms)
    }

    fn send_from(&mut self, from: usize, frame: &[u8]) {
        self.stats.frames_sent += 1;
        for to in 0..self.mailboxes.len() {
            if to == from {
                continue;
            }
            if self.rng.gen::<f64>() < self.config.loss_rate {
                self.stats.frames_lost += 1;
                continue;
            }
            let mut data = frame.to_vec();
            if !data.is_empty() && self.rng.gen::<f64>() < self.config.corrupt_prob {
                let idx = self.rng.gen_range(0..data.len());
                data[idx] ^= 1u8 << self.rng.gen_range(0..8u8);
                self.stats.frames_corrupted += 1;
            }
            let deliver_at = self.now + self.delay();
            self.in_flight.push(InFlight {
                deliver_at,
                to,
                data: data.clone(),
            });
            if self.rng.gen::<f64>() < self.config.duplicate_prob {
                let deliver_at = self.now + self.delay();
                self.in_flight.push(InFlight {
                    deliver_at,
                    to,
                    data,
                });
                self.stats.frames_duplicated += 1;
            }
        }
    }

    fn advance(&mut self, now: Millis) {
        self.now = now;
        let mut i = 0;
        while i < self.in_flight.len() {
            if now.has_reached(self.in_flight[i].deliver_at) {
                let frame = self.in_flight.swap_remove(i);
                self.mailboxes[frame.to].push_back(frame.data);
                self.stats.frames_delivered += 1;
            } else {
                i += 1;
            }
        }
    }
}

/// Handle to the shared bus; clones address the same medium
#[derive(Clone)]
pub struct BroadcastBus {
    core: Rc<RefCell<BusCore>>,
}

impl BroadcastBus {
    pub fn new(config: BusConfig, seed: u64) -> Self {
        BroadcastBus {
            core: Rc::new(RefCell::new(BusCore {
                config,
                rng: StdRng::seed_from_u64(seed),
                mailboxes: Vec::new(),
                in_flight: Vec::new(),
                now: Millis::ZERO,
                stats: BusStats::default(),
            })),
        }
    }

    /// Attach a new endpoint with its own mailbox
    pub fn endpoint(&self) -> BusEndpoint {
        let mut core = self.core.borrow_mut();
        core.mailboxes.push(VecDeque::new());
        BusEndpoint {
            core: Rc::clone(&self.core),
            index: core.mailboxes.len() - 1,
        }
    }

    /// Another handle onto an existing mailbox, for node restarts
    pub fn endpoint_at(&self, index: usize) -> BusEndpoint {
        BusEndpoint {
            core: Rc::clone(&self.core),
            index,
        }
    }

    /// Drop everything queued for `index`
    pub fn clear_mailbox(&self, index: usize) {
        self.core.borrow_mut().mailboxes[index].clear();
    }

    /// Move matured frames into their mailboxes
    pub fn advance(&self, now: Millis) {
        self.core.borrow_mut().advance(now);
    }

    pub fn stats(&self) -> BusStats {
        self.core.borrow().stats
    }
}

/// One node's attachment point on the bus
pub struct BusEndpoint {
    core: Rc<RefCell<BusCore>>,
    index: usize,
}

impl Transport for BusEndpoint {
    fn broadcast(&mut self, frame: &[u8]) {
        self.core.borrow_mut().send_from(self.index, frame);
    }

    fn poll(&mut self) -> Option<Vec<u8>> {
        self.core.borrow_mut().mailboxes[self.index].pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_bus_delivers_to_everyone_but_sender() {
        let bus = BroadcastBus::new(BusConfig::clean(), 1);
        let mut a = bus.endpoint();
        let mut b = bus.endpoint();
        let mut c = bus.endpoint();

        a.broadcast(b"hello");
        bus.advance(Millis(25));
        assert_eq!(a.poll(), None);
        assert_eq!(b.poll().as_deref(), Some(b"hello".as_slice()));
        assert_eq!(c.poll().as_deref(), Some(b"hello".as_slice()));
        assert_eq!(bus.stats().frames_delivered, 2);
    }

    #[test]
    fn test_delayed_frame_waits_for_maturity() {
        let config = BusConfig {
            min_delay_ms: 100,
            max_delay_ms: 100,
            ..BusConfig::clean()
        };
        let bus = BroadcastBus::new(config, 1);
        let mut a = bus.endpoint();
        let mut b = bus.endpoint();

        a.broadcast(b"late");
        bus.advance(Millis(99));
        assert_eq!(b.poll(), None);
        bus.advance(Millis(100));
        assert_eq!(b.poll().as_deref(), Some(b"late".as_slice()));
    }

    #[test]
    fn test_total_loss_drops_everything() {
        let config = BusConfig {
            loss_rate: 1.0,
            ..BusConfig::clean()
        };
        let bus = BroadcastBus::new(config, 1);
        let mut a = bus.endpoint();
        let mut b = bus.endpoint();

        a.broadcast(b"gone");
        bus.advance(Millis(25));
        assert_eq!(b.poll(), None);
        assert_eq!(bus.stats().frames_lost, 1);
    }

    #[test]
    fn test_corruption_flips_exactly_one_bit() {
        let config = BusConfig {
            corrupt_prob: 1.0,
            ..BusConfig::clean()
        };
        let bus = BroadcastBus::new(config, 42);
        let mut a = bus.endpoint();
        let mut b = bus.endpoint();

        a.broadcast(b"payload");
        bus.advance(Millis(25));
        let got = b.poll().unwrap();
        let diff: u32 = got
            .iter()
            .zip(b"payload")
            .map(|(x, y)| (x ^ y).count_ones())
            .sum();
        assert_eq!(diff, 1);
    }
}
