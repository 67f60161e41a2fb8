//! Per-case signal plans
//!
//! Which movements go green in which case is deployment data, like the
//! rotation table. The default plan matches the installed three-approach
//! intersection the coordinator was built for.

use ampel_core::Case;

use crate::light::{Crossing, Movement};

/// Indications for one case while its green holds
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CasePlan {
    /// Movements with full green
    pub greens: Vec<Movement>,
    /// Permissive movements shown flashing amber alongside the greens
    pub yield_flash: Vec<Movement>,
    /// Crossings with walk
    pub walk: Vec<Crossing>,
}

/// Full deployment plan over all three cases
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignalPlan {
    cases: [CasePlan; 3],
}

impl SignalPlan {
    pub fn new(cases: [CasePlan; 3]) -> Self {
        SignalPlan { cases }
    }

    /// Plan for `case`; total over the valid case range
    #[inline]
    pub fn case_plan(&self, case: Case) -> &CasePlan {
        &self.cases[(case.get() - 1) as usize]
    }
}

impl Default for SignalPlan {
    fn default() -> Self {
        SignalPlan {
            cases: [
                CasePlan {
                    greens: vec![Movement::S2N, Movement::S2W],
                    yield_flash: vec![Movement::N2W, Movement::W2S],
                    walk: vec![Crossing::N1, Crossing::S1],
                },
                CasePlan {
                    greens: vec![Movement::N2S, Movement::N2W],
                    yield_flash: vec![Movement::W2S],
                    walk: vec![Crossing::W2, Crossing::S2, Crossing::N2],
                },
                CasePlan {
                    greens: vec![Movement::W2N, Movement::W2S],
                    yield_flash: vec![Movement::N2W],
                    walk: vec![Crossing::W1, Crossing::S2],
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan_case_lookup() {
        let plan = SignalPlan::default();
        assert_eq!(
            plan.case_plan(Case::C1).greens,
            vec![Movement::S2N, Movement::S2W]
        );
        assert_eq!(plan.case_plan(Case::C2).yield_flash, vec![Movement::W2S]);
        assert_eq!(
            plan.case_plan(Case::C3).walk,
            vec![Crossing::W1, Crossing::S2]
        );
    }

    #[test]
    fn test_greens_never_overlap_across_plan() {
        // A movement green in one case must not be green in another at the
        // same time; cases are exclusive by construction, but the plan
        // itself must also keep greens disjoint from its own yield set
        let plan = SignalPlan::default();
        for case in [Case::C1, Case::C2, Case::C3] {
            let p = plan.case_plan(case);
            for g in &p.greens {
                assert!(!p.yield_flash.contains(g));
            }
        }
    }
}
