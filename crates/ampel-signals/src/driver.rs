//! Output driver
//!
//! Pure mapping from the current phase picture to lamp states. The runtime
//! refreshes the image after every state change and on every tick so that
//! flashing indications stay on the shared blink phase.

use ampel_core::NodeId;
use ampel_phase::{PhaseState, PhaseTable, SubPhase};

use crate::light::{Crossing, LightState, Movement, PedState};
use crate::plan::SignalPlan;

/// Lamp states for every head at the intersection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct IntersectionImage {
    heads: [LightState; 6],
    peds: [PedState; 6],
}

impl IntersectionImage {
    #[inline]
    pub fn head(&self, m: Movement) -> LightState {
        self.heads[m.index()]
    }

    #[inline]
    pub fn ped(&self, c: Crossing) -> PedState {
        self.peds[c.index()]
    }

    fn set_head(&mut self, m: Movement, s: LightState) {
        self.heads[m.index()] = s;
    }

    fn set_ped(&mut self, c: Crossing, s: PedState) {
        self.peds[c.index()] = s;
    }
}

/// Build the intersection image for the current phase
///
/// Exactly one case's movements hold green outside amber, all-red and
/// safety. In safety every vehicle head flashes amber and pedestrian heads
/// go dark.
pub fn intersection_image(
    plan: &SignalPlan,
    phase: &PhaseState,
    in_safety: bool,
) -> IntersectionImage {
    let mut image = IntersectionImage::default();

    if in_safety {
        for m in Movement::ALL {
            image.set_head(m, LightState::AmberFlash);
        }
        for c in Crossing::ALL {
            image.set_ped(c, PedState::Dark);
        }
        return image;
    }

    let case_plan = plan.case_plan(phase.case);
    match phase.sub {
        SubPhase::Stable => {
            for &m in &case_plan.greens {
                image.set_head(m, LightState::Green);
            }
            for &m in &case_plan.yield_flash {
                image.set_head(m, LightState::AmberFlash);
            }
            for &c in &case_plan.walk {
                image.set_ped(c, PedState::Walk);
            }
        }
        SubPhase::Amber => {
            // The outgoing case's greens drop to steady amber
            for &m in &case_plan.greens {
                image.set_head(m, LightState::AmberFixed);
            }
        }
        SubPhase::AllRed => {}
    }
    image
}

/// Single status head of one controller node
///
/// The two-node deployments run one head per node instead of a full
/// per-movement board: green while this node's case holds, steady amber
/// while it is the off-node, red otherwise, flashing amber in safety.
pub fn status_head(
    table: &PhaseTable,
    phase: &PhaseState,
    me: NodeId,
    in_safety: bool,
) -> LightState {
    if in_safety {
        return LightState::AmberFlash;
    }
    match phase.sub {
        SubPhase::Stable => {
            if table.is_active(phase.case, me) {
                LightState::Green
            } else {
                LightState::Red
            }
        }
        SubPhase::Amber => {
            if phase.off_node == me {
                LightState::AmberFixed
            } else {
                LightState::Red
            }
        }
        SubPhase::AllRed => LightState::Red,
    }
}
