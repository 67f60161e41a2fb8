//! Leader power-loss: independent beacon-loss detection, safety blink, and
//! the priority-ordered claim that follows.

use ampel_core::NodeId;
use ampel_signals::{LightState, Movement};
use ampel_test::{BusConfig, TestCluster};

#[test]
fn test_followers_detect_loss_then_best_rank_takes_over() {
    ampel_test::init_logging();
    let mut cluster = TestCluster::three_nodes(BusConfig::clean(), 23);

    cluster.run_ms(3_000);
    assert_eq!(cluster.leaders(), vec![NodeId::new(0)]);

    // Pull the plug on the leader. Its last beacon went out at t=2000 and
    // reached the followers one tick later.
    cluster.power_off(0);

    // Not a moment early: at exactly the loss timeout the followers still
    // hold the last known phase
    cluster.run_ms(7_025);
    assert!(!cluster.node(1).coordinator().in_safety());
    assert!(!cluster.node(2).coordinator().in_safety());

    // One tick later both are blinking amber
    cluster.step();
    for i in [1, 2] {
        assert!(cluster.node(i).coordinator().in_safety());
        assert_eq!(cluster.node(i).head(), LightState::AmberFlash);
        for m in Movement::ALL {
            assert_eq!(cluster.node(i).image().head(m), LightState::AmberFlash);
        }
    }

    // Node 1 outranks node 2, so its claim slot opens first and it wins the
    // window; node 2 stays follower
    cluster.run_ms(5_000);
    assert_eq!(cluster.leaders(), vec![NodeId::new(1)]);
    assert!(!cluster.node(2).coordinator().is_leader());
    assert_eq!(
        cluster.node(2).coordinator().leader_id(),
        Some(NodeId::new(1))
    );
    assert!(!cluster.node(2).coordinator().in_safety());
    // The new leader resumed the rotation; lights are live again
    assert_ne!(cluster.node(2).head(), LightState::AmberFlash);
}

#[test]
fn test_rebooted_leader_reclaims_through_startup_grace() {
    let mut cluster = TestCluster::three_nodes(BusConfig::clean(), 29);
    cluster.run_ms(3_000);
    cluster.power_off(0);
    cluster.run_ms(12_000);
    assert_eq!(cluster.leaders(), vec![NodeId::new(1)]);

    // Node 0 comes back as a follower, syncs to node 1, and claims once its
    // startup grace window closes without hearing anyone better
    cluster.restart(0);
    cluster.run_ms(2_000);
    assert_eq!(
        cluster.node(0).coordinator().leader_id(),
        Some(NodeId::new(1))
    );
    assert!(!cluster.node(0).coordinator().is_leader());

    cluster.run_ms(5_000);
    assert_eq!(cluster.leaders(), vec![NodeId::new(0)]);
    assert_eq!(
        cluster.node(1).coordinator().leader_id(),
        Some(NodeId::new(0))
    );
    // The outgoing leader announced the handover
    assert!(cluster.node(0).coordinator().stats().yields_rx >= 1);
}
