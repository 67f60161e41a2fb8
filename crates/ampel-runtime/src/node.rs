//! The node shell
//!
//! Glue between the sans-IO coordinator and the outside world: drains the
//! transport through the codec, feeds the coordinator, flushes its outbound
//! queue, and refreshes the output image every tick so flashing indications
//! stay on the shared blink phase.

use std::time::Duration;

use ampel_core::{Millis, NodeConfig};
use ampel_election::{Coordinator, CoordinatorStats};
use ampel_signals::{
    blink_on, intersection_image, status_head, IntersectionImage, LightState, SignalPlan,
};
use ampel_wire::{Codec, LineScanner};

use crate::io::Transport;
use crate::task::PeriodicTask;

/// How the transport delivers received bytes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RxFraming {
    /// Each polled buffer is one complete frame (mesh broadcast)
    Datagram,
    /// Polled buffers are arbitrary chunks of a newline-delimited stream
    /// (UART reception)
    LineStream,
}

/// Runtime counters
#[derive(Clone, Copy, Debug, Default)]
pub struct RuntimeStats {
    pub ticks: u64,
    pub frames_in: u64,
    pub frames_out: u64,
    pub decode_errors: u64,
}

/// Frames accepted from the transport per tick; reception is drained
/// opportunistically but must stay bounded
const MAX_RX_PER_TICK: usize = 32;

/// One controller node: coordinator, codec, transport and outputs
pub struct Node<T: Transport, C: Codec> {
    coordinator: Coordinator,
    transport: T,
    codec: C,
    framing: RxFraming,
    scanner: LineScanner,
    plan: SignalPlan,
    image: IntersectionImage,
    head: LightState,
    blink: bool,
    stats: RuntimeStats,
}

impl<T: Transport, C: Codec> Node<T, C> {
    pub fn new(config: NodeConfig, transport: T, codec: C, framing: RxFraming, now: Millis) -> Self {
        Self::with_plan(config, transport, codec, framing, SignalPlan::default(), now)
    }

    pub fn with_plan(
        config: NodeConfig,
        transport: T,
        codec: C,
        framing: RxFraming,
        plan: SignalPlan,
        now: Millis,
    ) -> Self {
        let coordinator = Coordinator::new(config, now);
        let mut node = Node {
            coordinator,
            transport,
            codec,
            framing,
            scanner: LineScanner::new(),
            plan,
            image: IntersectionImage::default(),
            head: LightState::Red,
            blink: true,
            stats: RuntimeStats::default(),
        };
        node.flush_tx();
        node.refresh_outputs(now);
        node
    }

    /// One cooperative tick: drain reception, advance the protocol, flush
    /// transmission, refresh outputs
    pub fn tick(&mut self, now: Millis) {
        self.stats.ticks += 1;
        self.drain_rx(now);
        self.coordinator.tick(now);
        self.flush_tx();
        self.refresh_outputs(now);
    }

    fn drain_rx(&mut self, now: Millis) {
        for _ in 0..MAX_RX_PER_TICK {
            let Some(buf) = self.transport.poll() else {
                break;
            };
            match self.framing {
                RxFraming::Datagram => self.feed_frame(now, &buf),
                RxFraming::LineStream => {
                    self.scanner.push(&buf);
                    while let Some(line) = self.scanner.next_line() {
                        let line = line.to_vec();
                        self.feed_frame(now, &line);
                    }
                }
            }
        }
    }

    fn feed_frame(&mut self, now: Millis, frame: &[u8]) {
        match self.codec.decode(frame) {
            Ok(msg) => {
                self.stats.frames_in += 1;
                self.coordinator.handle_frame(now, msg);
            }
            Err(e) => {
                // Garbled transport input: drop, count, carry on
                self.stats.decode_errors += 1;
                tracing::debug!(node = %self.coordinator.config().id, error = %e, "frame dropped");
            }
        }
    }

    fn flush_tx(&mut self) {
        while let Some(msg) = self.coordinator.pop_outbound() {
            match self.codec.encode(&msg) {
                Ok(frame) => {
                    self.transport.broadcast(&frame);
                    self.stats.frames_out += 1;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "encode failed, message dropped");
                }
            }
        }
    }

    fn refresh_outputs(&mut self, now: Millis) {
        let in_safety = self.coordinator.in_safety();
        let phase = self.coordinator.phase();
        self.image = intersection_image(&self.plan, phase, in_safety);
        self.head = status_head(
            self.coordinator.table(),
            phase,
            self.coordinator.config().id,
            in_safety,
        );
        self.blink = blink_on(now, self.coordinator.config().timing.blink_ms);
    }

    #[inline]
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Current per-movement lamp image
    #[inline]
    pub fn image(&self) -> &IntersectionImage {
        &self.image
    }

    /// Current single status head state
    #[inline]
    pub fn head(&self) -> LightState {
        self.head
    }

    /// Shared blink phase sampled at the last tick
    #[inline]
    pub fn blink(&self) -> bool {
        self.blink
    }

    #[inline]
    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }

    #[inline]
    pub fn protocol_stats(&self) -> &CoordinatorStats {
        self.coordinator.stats()
    }

    #[inline]
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

impl<T: Transport, C: Codec> PeriodicTask for Node<T, C> {
    fn tick(&mut self, now: Millis) -> Duration {
        Node::tick(self, now);
        Duration::from_millis(u64::from(self.coordinator.config().timing.tick_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ampel_core::{Case, NodeId};
    use ampel_signals::Movement;
    use ampel_wire::{Beacon, Message, PhaseFlag, SerialCodec};

    use crate::io::QueueTransport;

    fn follower(id: u8) -> Node<QueueTransport, SerialCodec> {
        Node::new(
            NodeConfig::for_node(NodeId::new(id)),
            QueueTransport::new(),
            SerialCodec::new(),
            RxFraming::LineStream,
            Millis::ZERO,
        )
    }

    fn leader(id: u8) -> Node<QueueTransport, SerialCodec> {
        let config = NodeConfig {
            start_as_leader: true,
            ..NodeConfig::for_node(NodeId::new(id))
        };
        Node::new(
            config,
            QueueTransport::new(),
            SerialCodec::new(),
            RxFraming::LineStream,
            Millis::ZERO,
        )
    }

    fn beacon_line(leader: u8, seq: u32, case: Case) -> Vec<u8> {
        SerialCodec::new()
            .encode(&Message::Beacon(Beacon {
                leader: NodeId::new(leader),
                seq,
                case,
                flag: PhaseFlag::Stable,
                off_node: NodeId::ZERO,
                lease_ttl_ms: 15_000,
                elapsed_ms: 0,
            }))
            .unwrap()
    }

    #[test]
    fn test_leader_boot_broadcasts_a_beacon() {
        let mut node = leader(0);
        let sent = node.transport_mut().take_sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with(b"B,0,0,"));
    }

    #[test]
    fn test_follower_adopts_beacon_split_across_chunks() {
        let mut node = follower(1);
        let line = beacon_line(0, 0, Case::C3);
        let (a, b) = line.split_at(7);
        node.transport_mut().inject(a.to_vec());
        node.transport_mut().inject(b.to_vec());
        node.tick(Millis(100));
        assert_eq!(node.stats().frames_in, 1);
        assert_eq!(node.coordinator().phase().case, Case::C3);
        assert_eq!(node.coordinator().leader_id(), Some(NodeId::new(0)));
    }

    #[test]
    fn test_garbled_frame_dropped_without_state_change() {
        let mut node = follower(1);
        let mut line = beacon_line(0, 0, Case::C3);
        line[2] ^= 0x20; // flip a payload byte, checksum now disagrees
        node.transport_mut().inject(line);
        node.tick(Millis(100));
        assert_eq!(node.stats().decode_errors, 1);
        assert_eq!(node.stats().frames_in, 0);
        assert_eq!(node.coordinator().leader_id(), None);
    }

    #[test]
    fn test_outputs_refresh_from_adopted_phase() {
        let mut node = follower(1);
        node.transport_mut().inject(beacon_line(0, 0, Case::C1));
        node.tick(Millis(100));
        // Case 1 greens node 1: our status head goes green
        assert_eq!(node.head(), LightState::Green);
        assert_eq!(
            node.image().head(Movement::S2N),
            ampel_signals::LightState::Green
        );
    }

    #[test]
    fn test_safety_image_after_beacon_silence() {
        let mut node = follower(1);
        node.transport_mut().inject(beacon_line(0, 0, Case::C1));
        let mut t = 100;
        while t <= 9_000 {
            node.tick(Millis(t));
            t += 25;
        }
        assert!(node.coordinator().in_safety());
        assert_eq!(node.head(), LightState::AmberFlash);
        for m in Movement::ALL {
            assert_eq!(node.image().head(m), LightState::AmberFlash);
        }
    }

    #[test]
    fn test_periodic_task_returns_tick_cadence() {
        let mut node = follower(1);
        let next = PeriodicTask::tick(&mut node, Millis(25));
        assert_eq!(next, Duration::from_millis(25));
    }
}
