//! Ampel Test - Simulated bus and cluster harness
//!
//! Deterministic multi-node protocol validation:
//! - A seeded chaos bus with loss, duplication, corruption and delay
//! - A virtual-time cluster running full runtime nodes
//!
//! Scenario tests live under `tests/`; codec benchmarks under `benches/`.

pub mod bus;
pub mod cluster;

pub use bus::*;
pub use cluster::*;

/// Opt-in logging for debugging a failing scenario
///
/// Honors `RUST_LOG`; safe to call from every test.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
