//! Identity and priority types for the coordinator
//!
//! Node ids are small integers, unique per deployment. Priority is a
//! configured total order over those ids: rank 0 claims leadership first.

use std::fmt;

/// Controller node identity within one intersection deployment
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeId(pub u8);

impl NodeId {
    pub const ZERO: NodeId = NodeId(0);

    #[inline]
    pub fn new(id: u8) -> Self {
        NodeId(id)
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn from_byte(b: u8) -> Self {
        NodeId(b)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Election priority rank - lower wins
///
/// `UNKNOWN` is the floor assigned to ids missing from the configured order,
/// so an unconfigured node can never outrank a configured one.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rank(pub u8);

impl Rank {
    pub const HIGHEST: Rank = Rank(0);
    pub const UNKNOWN: Rank = Rank(0xFE);

    #[inline]
    pub fn new(rank: u8) -> Self {
        Rank(rank)
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn from_byte(b: u8) -> Self {
        Rank(b)
    }

    #[inline]
    pub fn is_known(self) -> bool {
        self.0 < Self::UNKNOWN.0
    }
}

impl Default for Rank {
    fn default() -> Self {
        Rank::UNKNOWN
    }
}

impl fmt::Debug for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "Rank({})", self.0)
        } else {
            write!(f, "Rank(?)")
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Configured total order over node ids: position in the list is the rank
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriorityOrder {
    order: Vec<NodeId>,
}

impl PriorityOrder {
    pub fn new(order: Vec<NodeId>) -> Self {
        PriorityOrder { order }
    }

    pub fn from_ids(ids: &[u8]) -> Self {
        PriorityOrder {
            order: ids.iter().copied().map(NodeId::new).collect(),
        }
    }

    /// Rank of `id`, or `Rank::UNKNOWN` for ids outside the configured order
    pub fn rank_of(&self, id: NodeId) -> Rank {
        self.order
            .iter()
            .position(|&n| n == id)
            .map(|p| Rank(p as u8))
            .unwrap_or(Rank::UNKNOWN)
    }

    /// Does `a` strictly outrank `b`?
    ///
    /// Compares `(rank, id)` lexicographically so the order stays total even
    /// between two unconfigured ids. Claim resolution and preemption both
    /// rely on this being a strict total order.
    pub fn outranks(&self, a: NodeId, b: NodeId) -> bool {
        (self.rank_of(a), a) < (self.rank_of(b), b)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for PriorityOrder {
    fn default() -> Self {
        PriorityOrder::from_ids(&[0, 1, 2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_of_configured_ids() {
        let order = PriorityOrder::from_ids(&[0, 1, 2]);
        assert_eq!(order.rank_of(NodeId::new(0)), Rank::HIGHEST);
        assert_eq!(order.rank_of(NodeId::new(1)), Rank(1));
        assert_eq!(order.rank_of(NodeId::new(2)), Rank(2));
    }

    #[test]
    fn test_rank_of_unknown_id() {
        let order = PriorityOrder::from_ids(&[0, 1, 2]);
        assert_eq!(order.rank_of(NodeId::new(9)), Rank::UNKNOWN);
        assert!(!order.rank_of(NodeId::new(9)).is_known());
    }

    #[test]
    fn test_rank_respects_configured_order_not_id_order() {
        let order = PriorityOrder::from_ids(&[2, 0, 1]);
        assert_eq!(order.rank_of(NodeId::new(2)), Rank::HIGHEST);
        assert!(order.outranks(NodeId::new(2), NodeId::new(0)));
    }

    #[test]
    fn test_outranks_is_strict() {
        let order = PriorityOrder::default();
        let a = NodeId::new(1);
        assert!(!order.outranks(a, a));
    }

    #[test]
    fn test_outranks_breaks_unknown_ties_by_id() {
        let order = PriorityOrder::from_ids(&[0]);
        // 7 and 9 are both unranked; the lower id wins
        assert!(order.outranks(NodeId::new(7), NodeId::new(9)));
        assert!(!order.outranks(NodeId::new(9), NodeId::new(7)));
    }
}
