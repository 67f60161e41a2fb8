//! Case rotation table
//!
//! Which node goes green in which case, and how cases rotate, is deployment
//! data rather than logic. The default table matches the installed
//! three-approach intersection: case 1 greens node 1, case 2 greens node 0,
//! case 3 greens node 2.

use ampel_core::{Case, NodeId, Topology};

/// Per-deployment case table: green-node map plus rotation order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseTable {
    topology: Topology,
    /// Green node for cases 1..=3, indexed by `case - 1`
    green: [NodeId; 3],
}

impl PhaseTable {
    pub fn new(topology: Topology, green: [NodeId; 3]) -> Self {
        PhaseTable { topology, green }
    }

    /// Stock green-node map for a topology; custom maps go through `new`
    pub fn for_topology(topology: Topology) -> Self {
        let green = match topology {
            Topology::Two => [NodeId::new(1), NodeId::new(0), NodeId::new(0)],
            Topology::Three => [NodeId::new(1), NodeId::new(0), NodeId::new(2)],
        };
        PhaseTable { topology, green }
    }

    /// Node that holds green in `case`; total over the valid case range
    #[inline]
    pub fn active_node(&self, case: Case) -> NodeId {
        self.green[(case.get() - 1) as usize]
    }

    /// Is `node` the green node of `case`?
    #[inline]
    pub fn is_active(&self, case: Case, node: NodeId) -> bool {
        self.active_node(case) == node
    }

    /// Case that follows `current` in the rotation
    pub fn next_case(&self, current: Case) -> Case {
        match self.topology {
            // Two heads alternate between cases 2 and 1
            Topology::Two => {
                if current == Case::C2 {
                    Case::C1
                } else {
                    Case::C2
                }
            }
            Topology::Three => match current {
                Case::C1 => Case::C2,
                Case::C2 => Case::C3,
                _ => Case::C1,
            },
        }
    }

    #[inline]
    pub fn topology(&self) -> Topology {
        self.topology
    }
}

impl Default for PhaseTable {
    fn default() -> Self {
        PhaseTable {
            topology: Topology::Three,
            green: [NodeId::new(1), NodeId::new(0), NodeId::new(2)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_green_map() {
        let table = PhaseTable::default();
        assert_eq!(table.active_node(Case::C1), NodeId::new(1));
        assert_eq!(table.active_node(Case::C2), NodeId::new(0));
        assert_eq!(table.active_node(Case::C3), NodeId::new(2));
    }

    #[test]
    fn test_three_node_rotation_visits_every_case() {
        let table = PhaseTable::default();
        let mut case = Case::C1;
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(case);
            case = table.next_case(case);
        }
        assert_eq!(case, Case::C1); // full cycle
        seen.sort();
        assert_eq!(seen, vec![Case::C1, Case::C2, Case::C3]);
    }

    #[test]
    fn test_two_node_rotation_alternates() {
        let table = PhaseTable::new(
            Topology::Two,
            [NodeId::new(1), NodeId::new(0), NodeId::new(0)],
        );
        assert_eq!(table.next_case(Case::C2), Case::C1);
        assert_eq!(table.next_case(Case::C1), Case::C2);
        // Cycle length is exactly the topology size
        let c = table.next_case(table.next_case(Case::C2));
        assert_eq!(c, Case::C2);
    }

    #[test]
    fn test_two_node_rotation_recovers_from_case_three() {
        let table = PhaseTable::new(
            Topology::Two,
            [NodeId::new(1), NodeId::new(0), NodeId::new(0)],
        );
        // Case 3 can only arrive via a misconfigured peer; fold back in
        assert_eq!(table.next_case(Case::C3), Case::C2);
    }

    #[test]
    fn test_custom_green_map() {
        let table = PhaseTable::new(
            Topology::Three,
            [NodeId::new(5), NodeId::new(6), NodeId::new(7)],
        );
        assert_eq!(table.active_node(Case::C2), NodeId::new(6));
        assert!(table.is_active(Case::C3, NodeId::new(7)));
    }
}
