//! Protocol message model
//!
//! Three message kinds cross the wire: leader Beacons, election Claims and
//! leader Yield notices. The model is framing-independent; `serial` and
//! `mesh` render it into their respective envelopes.

use ampel_core::{Case, NodeId, Rank};

/// Beacon phase flag, the wire `am` field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum PhaseFlag {
    /// A case is green
    #[default]
    Stable = 0,
    /// The outgoing case is on amber
    Amber = 1,
    /// All-red clearance between amber and the next case
    AllRed = 2,
}

impl PhaseFlag {
    /// Parse from wire byte
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(PhaseFlag::Stable),
            1 => Some(PhaseFlag::Amber),
            2 => Some(PhaseFlag::AllRed),
            _ => None,
        }
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// Leader announcement: current phase and lease status
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Beacon {
    pub leader: NodeId,
    /// Monotonic per-leadership counter, reset to 0 by each new leader
    pub seq: u32,
    pub case: Case,
    pub flag: PhaseFlag,
    /// Node transitioning out of green during amber
    pub off_node: NodeId,
    /// Remaining lease time advertised by the leader
    pub lease_ttl_ms: u32,
    /// Time spent so far in the current sub-state
    pub elapsed_ms: u32,
}

/// Bid for leadership during an election
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Claim {
    pub node: NodeId,
    pub rank: Rank,
}

/// Informational notice that a leader is stepping down
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Yield {
    pub from: NodeId,
    pub to: NodeId,
}

/// Any protocol message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Message {
    Beacon(Beacon),
    Claim(Claim),
    Yield(Yield),
}

impl Message {
    /// Wire kind tag, shared by both framings
    #[inline]
    pub fn kind(&self) -> char {
        match self {
            Message::Beacon(_) => 'B',
            Message::Claim(_) => 'C',
            Message::Yield(_) => 'Y',
        }
    }
}

impl From<Beacon> for Message {
    fn from(b: Beacon) -> Self {
        Message::Beacon(b)
    }
}

impl From<Claim> for Message {
    fn from(c: Claim) -> Self {
        Message::Claim(c)
    }
}

impl From<Yield> for Message {
    fn from(y: Yield) -> Self {
        Message::Yield(y)
    }
}
