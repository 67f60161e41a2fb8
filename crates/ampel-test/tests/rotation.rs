//! Full rotation over the bus: the leader walks case 2 through amber and
//! all-red into case 3 and every node shows the matching lights.

use ampel_core::{Case, NodeId};
use ampel_phase::SubPhase;
use ampel_signals::{LightState, Movement, PedState};
use ampel_test::{BusConfig, TestCluster};

#[test]
fn test_leader_drives_rotation_and_followers_mirror_lights() {
    ampel_test::init_logging();
    let mut cluster = TestCluster::three_nodes(BusConfig::clean(), 11);

    // Node 0 leads in the default case 2; everyone syncs within a beacon
    cluster.run_ms(3_000);
    assert_eq!(cluster.leaders(), vec![NodeId::new(0)]);
    for i in 0..3 {
        assert_eq!(cluster.node(i).coordinator().phase().case, Case::C2);
    }
    // Case 2 greens node 0
    assert_eq!(cluster.node(0).head(), LightState::Green);
    assert_eq!(cluster.node(1).head(), LightState::Red);
    assert_eq!(cluster.node(2).head(), LightState::Red);

    // Case interval expires at 25s; the amber edge beacon reaches the
    // followers a tick later
    cluster.run_ms(22_100);
    for i in 0..3 {
        let phase = cluster.node(i).coordinator().phase();
        assert_eq!(phase.sub, SubPhase::Amber);
        assert_eq!(phase.off_node, NodeId::new(0));
    }
    assert_eq!(cluster.node(0).head(), LightState::AmberFixed);
    assert_eq!(cluster.node(1).head(), LightState::Red);
    assert_eq!(cluster.node(2).head(), LightState::Red);
    // Outgoing greens drop to steady amber on the movement board too
    assert_eq!(
        cluster.node(1).image().head(Movement::N2S),
        LightState::AmberFixed
    );

    // Amber (5s) then all-red clearance (700ms) land us in case 3
    cluster.run_ms(5_900);
    for i in 0..3 {
        let phase = cluster.node(i).coordinator().phase();
        assert_eq!(phase.case, Case::C3);
        assert_eq!(phase.sub, SubPhase::Stable);
    }
    // Case 3 greens node 2
    assert_eq!(cluster.node(0).head(), LightState::Red);
    assert_eq!(cluster.node(1).head(), LightState::Red);
    assert_eq!(cluster.node(2).head(), LightState::Green);
    assert_eq!(
        cluster.node(2).image().head(Movement::W2N),
        LightState::Green
    );
    assert_eq!(cluster.node(2).image().ped(ampel_signals::Crossing::W1), PedState::Walk);
}

#[test]
fn test_two_node_deployment_alternates_cases() {
    use ampel_core::{NodeConfig, Topology};

    let configs = (0..2)
        .map(|id| NodeConfig {
            start_as_leader: id == 0,
            topology: Topology::Two,
            ..NodeConfig::for_node(NodeId::new(id))
        })
        .collect();
    let mut cluster = TestCluster::new(configs, BusConfig::clean(), 5);

    cluster.run_ms(3_000);
    assert_eq!(cluster.node(1).coordinator().phase().case, Case::C2);
    // One full transition: 2 -> 1
    cluster.run_ms(28_000);
    assert_eq!(cluster.node(0).coordinator().phase().case, Case::C1);
    assert_eq!(cluster.node(1).coordinator().phase().case, Case::C1);
    // Case 1 greens node 1
    assert_eq!(cluster.node(1).head(), LightState::Green);
    assert_eq!(cluster.node(0).head(), LightState::Red);
}
