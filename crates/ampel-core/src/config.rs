//! Deployment configuration
//!
//! There is no CLI or config-file surface: a deployment bakes these values
//! in at integration time. Defaults mirror the installed field units.

use crate::{Case, NodeId, PriorityOrder, Topology};

/// Protocol timing constants, all in milliseconds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    /// How long a case stays green
    pub case_interval_ms: u32,
    /// Amber sub-state duration
    pub amber_interval_ms: u32,
    /// All-red clearance duration; 0 disables the clearance sub-state
    pub all_red_ms: u32,
    /// Flashing-amber blink half-period
    pub blink_ms: u32,
    /// Leader beacon re-broadcast period
    pub beacon_period_ms: u32,
    /// Follower beacon-loss timeout before safety mode
    pub loss_timeout_ms: u32,
    /// Leadership lease duration
    pub lease_ms: u32,
    /// Renew the lease once less than this much of it remains
    pub renew_before_ms: u32,
    /// Startup grace: how long a fresh node watches for better peers
    pub startup_wait_ms: u32,
    /// Election backoff base
    pub backoff_base_ms: u32,
    /// Election backoff step per priority rank
    pub backoff_step_ms: u32,
    /// Election backoff random jitter ceiling (inclusive)
    pub jitter_max_ms: u32,
    /// Claim window length
    pub claim_window_ms: u32,
    /// Delay between deciding to yield and handing leadership over
    pub handover_delay_ms: u32,
    /// Safety-mode suppression after yielding, while the new leader spins up
    pub yield_grace_ms: u32,
    /// Cooperative tick period
    pub tick_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            case_interval_ms: 25_000,
            amber_interval_ms: 5_000,
            all_red_ms: 700,
            blink_ms: 500,
            beacon_period_ms: 2_000,
            loss_timeout_ms: 8_000,
            lease_ms: 15_000,
            renew_before_ms: 5_000,
            startup_wait_ms: 4_000,
            backoff_base_ms: 800,
            backoff_step_ms: 600,
            jitter_max_ms: 400,
            claim_window_ms: 1_200,
            handover_delay_ms: 700,
            yield_grace_ms: 3_000,
            tick_ms: 25,
        }
    }
}

/// Everything one node knows about itself and its deployment
#[derive(Clone, Debug)]
pub struct NodeConfig {
    pub id: NodeId,
    /// Human-readable label stamped into mesh frames
    pub label: String,
    /// Boot straight into the leader role (exactly one node per site)
    pub start_as_leader: bool,
    pub topology: Topology,
    pub priority: PriorityOrder,
    pub start_case: Case,
    pub timing: TimingConfig,
    /// Election jitter seed; give every node a distinct value
    pub jitter_seed: u64,
}

impl NodeConfig {
    /// Baseline config for one node of the default 3-node deployment
    pub fn for_node(id: NodeId) -> Self {
        NodeConfig {
            id,
            label: format!("node-{}", id),
            start_as_leader: false,
            topology: Topology::Three,
            priority: PriorityOrder::default(),
            start_case: Case::DEFAULT,
            timing: TimingConfig::default(),
            jitter_seed: u64::from(id.to_byte()),
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig::for_node(NodeId::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timing_matches_field_units() {
        let t = TimingConfig::default();
        assert_eq!(t.case_interval_ms, 25_000);
        assert_eq!(t.loss_timeout_ms, 8_000);
        assert_eq!(t.claim_window_ms, 1_200);
        // Backoff separation: worst-case jitter never overlaps the next rank
        assert!(t.jitter_max_ms < t.backoff_step_ms);
    }

    #[test]
    fn test_for_node_labels() {
        let cfg = NodeConfig::for_node(NodeId::new(2));
        assert_eq!(cfg.label, "node-2");
        assert!(!cfg.start_as_leader);
    }
}
