//! Election bookkeeping
//!
//! The follower's substitute for consensus: rank-staggered backoff plus a
//! bounded claim window. Higher-priority nodes get earlier backoff slots, so
//! under normal delivery the best node claims first and everyone else hears
//! its claim before their own slot opens.

use ampel_core::{Millis, NodeId, Rank, TimingConfig};
use rand::rngs::StdRng;
use rand::Rng;

/// Backoff before this node may claim, staggered by rank with random jitter
///
/// The jitter ceiling stays below the per-rank step, so two distinct ranks
/// can never draw overlapping slots.
pub fn claim_backoff(timing: &TimingConfig, rank: Rank, rng: &mut StdRng) -> u32 {
    let jitter = rng.gen_range(0..=timing.jitter_max_ms);
    timing.backoff_base_ms + u32::from(rank.to_byte()) * timing.backoff_step_ms + jitter
}

/// One safety episode's election state
///
/// Present on the coordinator exactly while the node is in safety mode;
/// cleared by a valid beacon or by winning the claim window.
#[derive(Clone, Copy, Debug)]
pub struct ElectionState {
    /// When this node's claim slot opens
    pub backoff_until: Millis,
    /// Claim window in progress
    pub claiming: bool,
    /// Claim window close
    pub claim_until: Millis,
    /// Next periodic claim re-broadcast
    pub next_claim_tx: Millis,
    /// Best `(rank, id)` heard from any competing claim or beacon this episode
    pub observed_best: Option<(Rank, NodeId)>,
}

impl ElectionState {
    /// Open a new episode with a freshly drawn backoff slot
    pub fn scheduled(now: Millis, timing: &TimingConfig, rank: Rank, rng: &mut StdRng) -> Self {
        ElectionState {
            backoff_until: now + claim_backoff(timing, rank, rng),
            claiming: false,
            claim_until: now,
            next_claim_tx: now,
            observed_best: None,
        }
    }

    /// Record a competitor; keeps the best `(rank, id)` seen
    pub fn observe(&mut self, rank: Rank, id: NodeId) {
        let seen = (rank, id);
        match self.observed_best {
            Some(best) if best <= seen => {}
            _ => self.observed_best = Some(seen),
        }
    }

    /// Did this episode hear anyone strictly better than `(rank, id)`?
    pub fn heard_better_than(&self, rank: Rank, id: NodeId) -> bool {
        matches!(self.observed_best, Some(best) if best < (rank, id))
    }
}
