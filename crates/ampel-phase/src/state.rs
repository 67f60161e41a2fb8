//! Shared phase state
//!
//! One record of what the intersection is doing right now. The sequencer
//! authors it while this node leads; beacons overwrite it while following.

use ampel_core::{Case, NodeId};
use ampel_wire::{Beacon, PhaseFlag};

/// Sub-state within a case
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SubPhase {
    /// The case's node holds green
    #[default]
    Stable,
    /// The outgoing node is on amber
    Amber,
    /// All-red clearance before the next case
    AllRed,
}

impl SubPhase {
    #[inline]
    pub fn flag(self) -> PhaseFlag {
        match self {
            SubPhase::Stable => PhaseFlag::Stable,
            SubPhase::Amber => PhaseFlag::Amber,
            SubPhase::AllRed => PhaseFlag::AllRed,
        }
    }

    #[inline]
    pub fn from_flag(flag: PhaseFlag) -> Self {
        match flag {
            PhaseFlag::Stable => SubPhase::Stable,
            PhaseFlag::Amber => SubPhase::Amber,
            PhaseFlag::AllRed => SubPhase::AllRed,
        }
    }
}

/// Current phase picture, leader-authored or beacon-adopted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseState {
    pub case: Case,
    pub sub: SubPhase,
    /// Node leaving green; meaningful during amber and all-red
    pub off_node: NodeId,
    /// Where the rotation goes after clearance; leader-side only
    pub next_case: Case,
}

impl PhaseState {
    pub fn starting_at(case: Case) -> Self {
        PhaseState {
            case,
            sub: SubPhase::Stable,
            off_node: NodeId::ZERO,
            next_case: case,
        }
    }

    /// Overwrite the wire-visible fields from a received beacon
    ///
    /// `next_case` is a leader concern and stays untouched; it is recomputed
    /// from the table if this node later takes over.
    pub fn adopt(&mut self, beacon: &Beacon) {
        self.case = beacon.case;
        self.sub = SubPhase::from_flag(beacon.flag);
        self.off_node = beacon.off_node;
    }

    #[inline]
    pub fn flag(&self) -> PhaseFlag {
        self.sub.flag()
    }
}

impl Default for PhaseState {
    fn default() -> Self {
        PhaseState::starting_at(Case::DEFAULT)
    }
}
