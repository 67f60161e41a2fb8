//! The protocol coordinator
//!
//! One instance per node owns the entire protocol: current role, the phase
//! sequencer, the lease, the election machine and the outbound queue. It is
//! sans-IO: the runtime feeds it decoded messages and tick times, and drains
//! queued messages for transmission. No transport or pin access happens here.

use std::collections::VecDeque;

use ampel_core::{Millis, NodeConfig, NodeId, Rank};
use ampel_phase::{PhaseSequencer, PhaseState, PhaseTable};
use ampel_wire::{Beacon, Claim, Message, Yield};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::election::ElectionState;
use crate::lease::Lease;

/// Which side of the protocol this node currently runs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Driving the phase sequence and beaconing
    Leader,
    /// Mirroring the leader's announced phase
    Follower,
}

/// Protocol counters, cumulative since construction
#[derive(Clone, Copy, Debug, Default)]
pub struct CoordinatorStats {
    pub beacons_tx: u64,
    pub beacons_rx: u64,
    pub stale_beacons: u64,
    pub claims_tx: u64,
    pub safety_entries: u64,
    pub leaderships: u64,
    pub handovers: u64,
    pub yields_rx: u64,
}

/// Per-node protocol state machine
pub struct Coordinator {
    config: NodeConfig,
    my_rank: Rank,
    role: Role,
    sequencer: PhaseSequencer,
    lease: Option<Lease>,
    /// Next beacon sequence number; restarts at 0 with each leadership
    seq: u32,
    next_beacon_at: Millis,
    /// Present exactly while this follower runs an election episode
    election: Option<ElectionState>,
    /// Leader currently adopted, follower-side
    synced_to: Option<NodeId>,
    /// Highest sequence accepted from the synced leader; None accepts any
    last_seen_seq: Option<u32>,
    last_beacon_rx: Millis,
    /// Last lease TTL a leader advertised to us; informational
    adopted_lease_ttl: u32,
    /// One-shot startup grace deadline; disarmed by any better peer
    startup_watch: Option<Millis>,
    /// Pending deferred handover: fire time and preemptor
    handover: Option<(Millis, NodeId)>,
    /// Safety entry suppressed until here after yielding
    safety_hold: Option<Millis>,
    rng: StdRng,
    outbound: VecDeque<Message>,
    stats: CoordinatorStats,
}

impl Coordinator {
    pub fn new(config: NodeConfig, now: Millis) -> Self {
        let table = PhaseTable::for_topology(config.topology);
        Self::with_table(config, table, now)
    }

    /// Construct with a deployment-specific green-node table
    pub fn with_table(config: NodeConfig, table: PhaseTable, now: Millis) -> Self {
        let my_rank = config.priority.rank_of(config.id);
        let sequencer = PhaseSequencer::new(table, config.timing, config.start_case, now);
        let start_as_leader = config.start_as_leader;
        let startup_watch = (!start_as_leader).then(|| now + config.timing.startup_wait_ms);
        let rng = StdRng::seed_from_u64(config.jitter_seed);
        let mut coord = Coordinator {
            my_rank,
            role: Role::Follower,
            sequencer,
            lease: None,
            seq: 0,
            next_beacon_at: now,
            election: None,
            synced_to: None,
            last_seen_seq: None,
            last_beacon_rx: now,
            adopted_lease_ttl: 0,
            startup_watch,
            handover: None,
            safety_hold: None,
            rng,
            outbound: VecDeque::new(),
            stats: CoordinatorStats::default(),
            config,
        };
        if start_as_leader {
            coord.become_leader(now);
        }
        coord
    }

    /// One cooperative tick; never blocks
    pub fn tick(&mut self, now: Millis) {
        match self.role {
            Role::Leader => self.leader_tick(now),
            Role::Follower => self.follower_tick(now),
        }
    }

    /// Feed one decoded message in
    pub fn handle_frame(&mut self, now: Millis, msg: Message) {
        match msg {
            Message::Beacon(b) => self.on_beacon(now, b),
            Message::Claim(c) => self.on_claim(now, c),
            Message::Yield(y) => {
                // Informational only; the beacon silence that follows is
                // what actually drives failover
                self.stats.yields_rx += 1;
                tracing::info!(node = %self.config.id, from = %y.from, to = %y.to, "yield notice");
            }
        }
    }

    /// Drain the next message queued for transmission
    pub fn pop_outbound(&mut self) -> Option<Message> {
        self.outbound.pop_front()
    }

    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    #[inline]
    pub fn is_leader(&self) -> bool {
        self.role == Role::Leader
    }

    /// Degraded mode: no live leader adopted and not leading ourselves
    #[inline]
    pub fn in_safety(&self) -> bool {
        self.election.is_some() && self.synced_to.is_none()
    }

    #[inline]
    pub fn phase(&self) -> &PhaseState {
        self.sequencer.state()
    }

    #[inline]
    pub fn table(&self) -> &PhaseTable {
        self.sequencer.table()
    }

    /// Leader this node currently believes in, itself included
    pub fn leader_id(&self) -> Option<NodeId> {
        match self.role {
            Role::Leader => Some(self.config.id),
            Role::Follower => self.synced_to,
        }
    }

    #[inline]
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    #[inline]
    pub fn stats(&self) -> &CoordinatorStats {
        &self.stats
    }

    /// Remaining lease advertised by the adopted leader, as last heard
    #[inline]
    pub fn adopted_lease_ttl(&self) -> u32 {
        self.adopted_lease_ttl
    }

    // Leader side

    fn leader_tick(&mut self, now: Millis) {
        if let Some((at, to)) = self.handover {
            if now.has_reached(at) {
                self.complete_handover(now, to);
                return;
            }
        }
        let edge = self.sequencer.tick(now);
        if let Some(lease) = self.lease.as_mut() {
            if lease.renew_due(now) {
                lease.renew(now);
                tracing::info!(node = %self.config.id, "lease renewed");
            }
        }
        if edge.is_some() || now.has_reached(self.next_beacon_at) {
            self.emit_beacon(now);
        }
    }

    fn emit_beacon(&mut self, now: Millis) {
        let state = self.sequencer.state();
        let beacon = Beacon {
            leader: self.config.id,
            seq: self.seq,
            case: state.case,
            flag: state.flag(),
            off_node: state.off_node,
            lease_ttl_ms: self.lease.map_or(0, |l| l.remaining_ms(now)),
            elapsed_ms: self.sequencer.elapsed_in_substate(now),
        };
        self.seq = self.seq.wrapping_add(1);
        self.next_beacon_at = now + self.config.timing.beacon_period_ms;
        self.stats.beacons_tx += 1;
        tracing::debug!(seq = beacon.seq, case = %beacon.case, flag = ?beacon.flag, "beacon tx");
        self.outbound.push_back(Message::Beacon(beacon));
    }

    fn schedule_handover(&mut self, now: Millis, to: NodeId) {
        if let Some((_, current)) = self.handover {
            if !self.config.priority.outranks(to, current) {
                return;
            }
        }
        // Keep the original fire time if a still-better preemptor shows up
        let at = self
            .handover
            .map(|(at, _)| at)
            .unwrap_or(now + self.config.timing.handover_delay_ms);
        tracing::warn!(node = %self.config.id, %to, "higher-priority node active, handover scheduled");
        self.handover = Some((at, to));
    }

    fn complete_handover(&mut self, now: Millis, to: NodeId) {
        tracing::warn!(node = %self.config.id, %to, "yielding leadership");
        self.outbound.push_back(Message::Yield(Yield {
            from: self.config.id,
            to,
        }));
        self.stats.handovers += 1;
        self.handover = None;
        self.role = Role::Follower;
        self.lease = None;
        self.election = None;
        self.synced_to = Some(to);
        self.last_seen_seq = None;
        self.last_beacon_rx = now;
        self.safety_hold = Some(now + self.config.timing.yield_grace_ms);
    }

    // Follower side

    fn follower_tick(&mut self, now: Millis) {
        if let Some(deadline) = self.startup_watch {
            if now.has_reached(deadline) {
                // No higher-priority peer spoke up during the grace window,
                // so leadership is ours to take, current leader or not
                self.startup_watch = None;
                tracing::info!(node = %self.config.id, "startup grace over, claiming");
                let mut ep =
                    ElectionState::scheduled(now, &self.config.timing, self.my_rank, &mut self.rng);
                ep.backoff_until = now;
                self.election = Some(ep);
            }
        }

        let held = self.safety_hold.is_some_and(|h| !now.has_reached(h));
        if self.election.is_none()
            && !held
            && now.delta(self.last_beacon_rx) > self.config.timing.loss_timeout_ms as i32
        {
            self.enter_safety(now);
        }

        let Some(mut ep) = self.election else {
            return;
        };
        let timing = self.config.timing;
        if !ep.claiming {
            if now.has_reached(ep.backoff_until) {
                ep.claiming = true;
                ep.claim_until = now + timing.claim_window_ms;
                ep.next_claim_tx = now + timing.claim_window_ms / 3;
                tracing::info!(node = %self.config.id, rank = %self.my_rank, "claim window open");
                self.send_claim();
            }
        } else if now.has_reached(ep.claim_until) {
            if ep.heard_better_than(self.my_rank, self.config.id) {
                // Someone better is out there but has not beaconed yet;
                // stand down and draw a fresh slot
                self.election =
                    Some(ElectionState::scheduled(now, &timing, self.my_rank, &mut self.rng));
                return;
            }
            self.become_leader(now);
            return;
        } else if now.has_reached(ep.next_claim_tx) {
            ep.next_claim_tx = now + timing.claim_window_ms / 3;
            self.send_claim();
        }
        self.election = Some(ep);
    }

    fn enter_safety(&mut self, now: Millis) {
        self.stats.safety_entries += 1;
        self.synced_to = None;
        self.last_seen_seq = None;
        let ep = ElectionState::scheduled(now, &self.config.timing, self.my_rank, &mut self.rng);
        tracing::warn!(
            node = %self.config.id,
            slot_in_ms = now.remaining_until(ep.backoff_until),
            "beacon loss, entering safety mode"
        );
        self.election = Some(ep);
    }

    fn send_claim(&mut self) {
        self.stats.claims_tx += 1;
        self.outbound.push_back(Message::Claim(Claim {
            node: self.config.id,
            rank: self.my_rank,
        }));
    }

    fn become_leader(&mut self, now: Millis) {
        tracing::warn!(
            node = %self.config.id,
            case = %self.sequencer.state().case,
            "assuming leadership"
        );
        self.role = Role::Leader;
        self.election = None;
        self.synced_to = None;
        self.last_seen_seq = None;
        self.handover = None;
        self.safety_hold = None;
        self.startup_watch = None;
        self.seq = 0;
        self.lease = Some(Lease::start(
            now,
            self.config.timing.lease_ms,
            self.config.timing.renew_before_ms,
        ));
        self.sequencer.resume(now);
        self.stats.leaderships += 1;
        self.emit_beacon(now);
    }

    // Reception

    fn on_beacon(&mut self, now: Millis, b: Beacon) {
        if b.leader == self.config.id {
            // Our own frame echoed back by the bus
            return;
        }
        self.stats.beacons_rx += 1;
        self.note_peer(b.leader);
        match self.role {
            Role::Leader => {
                if self.config.priority.outranks(b.leader, self.config.id) {
                    self.schedule_handover(now, b.leader);
                } else {
                    tracing::debug!(peer = %b.leader, "beacon from lower-priority leader ignored");
                }
            }
            Role::Follower => {
                if self.election.is_none() {
                    if let (Some(leader), Some(seen)) = (self.synced_to, self.last_seen_seq) {
                        if b.leader == leader && b.seq <= seen {
                            self.stats.stale_beacons += 1;
                            return;
                        }
                        // A non-adopted node beaconing while we follow a
                        // better leader is a straggler winding down
                        if b.leader != leader && !self.config.priority.outranks(b.leader, leader) {
                            self.stats.stale_beacons += 1;
                            tracing::debug!(peer = %b.leader, "beacon from non-adopted leader ignored");
                            return;
                        }
                    }
                }
                self.adopt_beacon(now, b);
            }
        }
    }

    fn adopt_beacon(&mut self, now: Millis, b: Beacon) {
        if let Some(mut ep) = self.election {
            ep.observe(self.config.priority.rank_of(b.leader), b.leader);
            self.election = Some(ep);
            if ep.claiming && !self.config.priority.outranks(b.leader, self.config.id) {
                // Reclaiming over a lower-priority leader: mirror its phase
                // for the lights but keep the claim running until it yields
                self.sequencer.adopt(&b, now);
                self.last_beacon_rx = now;
                return;
            }
            tracing::info!(node = %self.config.id, leader = %b.leader, "beacon received, leaving safety");
        }
        self.election = None;
        self.synced_to = Some(b.leader);
        self.last_seen_seq = Some(b.seq);
        self.last_beacon_rx = now;
        self.adopted_lease_ttl = b.lease_ttl_ms;
        self.sequencer.adopt(&b, now);
        tracing::debug!(leader = %b.leader, seq = b.seq, case = %b.case, "beacon adopted");
    }

    fn on_claim(&mut self, now: Millis, c: Claim) {
        if c.node == self.config.id {
            return;
        }
        self.note_peer(c.node);
        let better = self.config.priority.outranks(c.node, self.config.id);
        match self.role {
            Role::Leader => {
                if better {
                    self.schedule_handover(now, c.node);
                }
            }
            Role::Follower => {
                if let Some(mut ep) = self.election {
                    ep.observe(self.config.priority.rank_of(c.node), c.node);
                    if ep.claiming && better {
                        tracing::info!(node = %self.config.id, winner = %c.node, "better claim heard, aborting ours");
                        ep = ElectionState::scheduled(
                            now,
                            &self.config.timing,
                            self.my_rank,
                            &mut self.rng,
                        );
                    }
                    self.election = Some(ep);
                }
            }
        }
    }

    /// Track better peers for the startup grace window
    fn note_peer(&mut self, peer: NodeId) {
        if self.startup_watch.is_some() && self.config.priority.outranks(peer, self.config.id) {
            tracing::debug!(node = %self.config.id, %peer, "higher-priority peer observed, startup watch disarmed");
            self.startup_watch = None;
        }
    }
}
