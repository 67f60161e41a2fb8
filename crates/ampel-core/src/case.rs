//! Phase case identifiers and deployment topology
//!
//! A "case" is one rotation state of the intersection (case 1, 2 or 3), not
//! a test case. Cases arrive off the wire, so construction is checked and
//! out-of-range values clamp to a safe default instead of propagating.

use std::fmt;

/// Number of distinct cases in a full 3-node rotation
pub const CASE_COUNT: u8 = 3;

/// Rotation phase identifier, always in `1..=3`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Case(u8);

impl Case {
    pub const C1: Case = Case(1);
    pub const C2: Case = Case(2);
    pub const C3: Case = Case(3);

    /// Fallback adopted when an out-of-range case value arrives
    pub const DEFAULT: Case = Case(2);

    pub fn new(value: u8) -> Option<Self> {
        (1..=CASE_COUNT).contains(&value).then_some(Case(value))
    }

    /// Clamp an arbitrary wire value into the valid range
    #[inline]
    pub fn saturating(value: u8) -> Self {
        Case::new(value).unwrap_or(Case::DEFAULT)
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        self.0
    }
}

impl Default for Case {
    fn default() -> Self {
        Case::DEFAULT
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deployment size: how many controller nodes share the intersection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Topology {
    Two,
    #[default]
    Three,
}

impl Topology {
    #[inline]
    pub fn node_count(self) -> usize {
        match self {
            Topology::Two => 2,
            Topology::Three => 3,
        }
    }

    /// Length of the case rotation cycle for this topology
    #[inline]
    pub fn cycle_len(self) -> usize {
        match self {
            Topology::Two => 2,
            Topology::Three => 3,
        }
    }
}
