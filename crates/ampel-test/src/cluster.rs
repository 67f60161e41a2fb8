//! Virtual-time cluster harness
//!
//! Runs full runtime `Node` shells over the simulated bus on a shared
//! virtual clock, with power-off and restart controls for failover
//! scenarios. Everything is deterministic under a fixed seed.

use ampel_core::{Millis, NodeConfig, NodeId};
use ampel_runtime::{Node, RxFraming};
use ampel_wire::SerialCodec;

use crate::bus::{BroadcastBus, BusConfig, BusEndpoint, BusStats};

/// One node under test plus the live/dead switch
struct Slot {
    node: Node<BusEndpoint, SerialCodec>,
    config: NodeConfig,
    alive: bool,
}

/// A simulated deployment of 2-3 nodes on one bus
pub struct TestCluster {
    bus: BroadcastBus,
    slots: Vec<Slot>,
    now: Millis,
    tick_ms: u32,
}

impl TestCluster {
    pub fn new(configs: Vec<NodeConfig>, bus_config: BusConfig, seed: u64) -> Self {
        let bus = BroadcastBus::new(bus_config, seed);
        let tick_ms = configs
            .first()
            .map(|c| c.timing.tick_ms)
            .unwrap_or(25);
        let slots = configs
            .into_iter()
            .map(|config| Slot {
                node: Node::new(
                    config.clone(),
                    bus.endpoint(),
                    SerialCodec::new(),
                    RxFraming::Datagram,
                    Millis::ZERO,
                ),
                config,
                alive: true,
            })
            .collect();
        TestCluster {
            bus,
            slots,
            now: Millis::ZERO,
            tick_ms,
        }
    }

    /// Default 3-node deployment, ids 0..=2, node 0 booted as leader
    pub fn three_nodes(bus_config: BusConfig, seed: u64) -> Self {
        let configs = (0..3)
            .map(|id| NodeConfig {
                start_as_leader: id == 0,
                ..NodeConfig::for_node(NodeId::new(id))
            })
            .collect();
        TestCluster::new(configs, bus_config, seed)
    }

    /// Same deployment but cold: everyone boots as follower
    pub fn three_cold_nodes(bus_config: BusConfig, seed: u64) -> Self {
        let configs = (0..3)
            .map(|id| NodeConfig::for_node(NodeId::new(id)))
            .collect();
        TestCluster::new(configs, bus_config, seed)
    }

    /// Advance one tick: mature the bus, then tick every live node
    pub fn step(&mut self) {
        self.now += self.tick_ms;
        self.bus.advance(self.now);
        for slot in &mut self.slots {
            if slot.alive {
                slot.node.tick(self.now);
            }
        }
    }

    /// Run `ms` of virtual time
    pub fn run_ms(&mut self, ms: u32) {
        let ticks = ms / self.tick_ms;
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Cut a node's power: it stops ticking and transmitting
    pub fn power_off(&mut self, index: usize) {
        self.slots[index].alive = false;
    }

    /// Reboot a node fresh at the current virtual time
    ///
    /// State does not survive the reboot and a previously configured leader
    /// comes back as a follower, entering through the startup grace window.
    pub fn restart(&mut self, index: usize) {
        self.bus.clear_mailbox(index);
        let config = NodeConfig {
            start_as_leader: false,
            ..self.slots[index].config.clone()
        };
        self.slots[index].node = Node::new(
            config,
            self.bus.endpoint_at(index),
            SerialCodec::new(),
            RxFraming::Datagram,
            self.now,
        );
        self.slots[index].alive = true;
    }

    pub fn node(&self, index: usize) -> &Node<BusEndpoint, SerialCodec> {
        &self.slots[index].node
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn bus_stats(&self) -> BusStats {
        self.bus.stats()
    }

    /// Ids of live nodes currently acting as leader
    pub fn leaders(&self) -> Vec<NodeId> {
        self.slots
            .iter()
            .filter(|s| s.alive && s.node.coordinator().is_leader())
            .map(|s| s.node.coordinator().config().id)
            .collect()
    }
}
