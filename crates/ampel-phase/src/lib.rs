//! Ampel Phase - Case rotation and leader-side sequencing
//!
//! This crate holds the phase layer of the coordinator:
//! - The case rotation table (green-node map, next-case order)
//! - The shared phase state record
//! - The leader's STABLE -> AMBER -> ALL_RED timing machine

pub mod sequencer;
pub mod state;
pub mod table;

pub use sequencer::*;
pub use state::*;
pub use table::*;
