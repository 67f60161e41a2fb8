//! Ampel Election - Leader-lease election and the protocol coordinator
//!
//! This crate holds the distributed part of the coordinator:
//! - The leadership lease and its renewal schedule
//! - Rank-staggered election backoff and the claim window
//! - The sans-IO per-node `Coordinator` tying roles, phase sequencing,
//!   safety detection, preemption and handover together

pub mod coordinator;
pub mod election;
pub mod lease;

pub use coordinator::*;
pub use election::*;
pub use lease::*;
