//! Leader-side phase sequencing
//!
//! Walks STABLE -> AMBER -> ALL_RED -> STABLE(next case) on monotonic
//! deadlines and reports each crossed edge so the owner can beacon it. The
//! machine never sends anything itself; it only keeps time and state.

use ampel_core::{Case, Millis, TimingConfig};
use ampel_wire::Beacon;

use crate::state::{PhaseState, SubPhase};
use crate::table::PhaseTable;

/// Edge just crossed by the sequencer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseEdge {
    /// Stable expired; the active node turned amber
    AmberStart,
    /// Amber expired; all-red clearance began
    AllRedStart,
    /// Clearance done; the next case went green
    CaseStart,
}

/// Leader phase timing machine
#[derive(Clone, Debug)]
pub struct PhaseSequencer {
    table: PhaseTable,
    timing: TimingConfig,
    state: PhaseState,
    /// Entry time of the current sub-state
    entered_at: Millis,
}

impl PhaseSequencer {
    pub fn new(table: PhaseTable, timing: TimingConfig, start_case: Case, now: Millis) -> Self {
        let mut state = PhaseState::starting_at(start_case);
        state.next_case = table.next_case(start_case);
        PhaseSequencer {
            table,
            timing,
            state,
            entered_at: now,
        }
    }

    /// Advance time; at most one edge fires per call
    pub fn tick(&mut self, now: Millis) -> Option<PhaseEdge> {
        let elapsed = now.elapsed_since(self.entered_at);
        match self.state.sub {
            SubPhase::Stable if elapsed >= self.timing.case_interval_ms => {
                self.state.off_node = self.table.active_node(self.state.case);
                self.state.next_case = self.table.next_case(self.state.case);
                self.state.sub = SubPhase::Amber;
                self.entered_at = now;
                tracing::info!(
                    case = %self.state.case,
                    off = %self.state.off_node,
                    next = %self.state.next_case,
                    "amber start"
                );
                Some(PhaseEdge::AmberStart)
            }
            SubPhase::Amber if elapsed >= self.timing.amber_interval_ms => {
                if self.timing.all_red_ms > 0 {
                    self.state.sub = SubPhase::AllRed;
                    self.entered_at = now;
                    tracing::debug!(case = %self.state.case, "all-red start");
                    Some(PhaseEdge::AllRedStart)
                } else {
                    self.begin_next_case(now);
                    Some(PhaseEdge::CaseStart)
                }
            }
            SubPhase::AllRed if elapsed >= self.timing.all_red_ms => {
                self.begin_next_case(now);
                Some(PhaseEdge::CaseStart)
            }
            _ => None,
        }
    }

    fn begin_next_case(&mut self, now: Millis) {
        self.state.case = self.state.next_case;
        self.state.sub = SubPhase::Stable;
        self.state.next_case = self.table.next_case(self.state.case);
        self.entered_at = now;
        tracing::info!(case = %self.state.case, "case start");
    }

    /// Overwrite phase from a received beacon (follower path)
    pub fn adopt(&mut self, beacon: &Beacon, now: Millis) {
        self.state.adopt(beacon);
        self.entered_at = now;
    }

    /// Re-anchor after this node takes (or retakes) leadership, so the
    /// adopted phase continues from here instead of firing a stale deadline
    pub fn resume(&mut self, now: Millis) {
        self.state.next_case = self.table.next_case(self.state.case);
        self.entered_at = now;
    }

    /// Time spent in the current sub-state
    #[inline]
    pub fn elapsed_in_substate(&self, now: Millis) -> u32 {
        now.elapsed_since(self.entered_at)
    }

    #[inline]
    pub fn state(&self) -> &PhaseState {
        &self.state
    }

    #[inline]
    pub fn table(&self) -> &PhaseTable {
        &self.table
    }
}
