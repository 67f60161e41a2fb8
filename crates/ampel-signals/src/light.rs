//! Signal head states and the shared blink phase
//!
//! A head state is what a lamp driver should show; `AmberFlash` resolves
//! against the site-wide blink phase so every head at the intersection
//! flashes in step regardless of which node drives it.

use ampel_core::Millis;

/// Vehicle head indication
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum LightState {
    #[default]
    Red,
    Green,
    /// Steady amber during the amber sub-state
    AmberFixed,
    /// Flashing amber: permissive yield during green, or safety mode
    AmberFlash,
}

impl LightState {
    /// Is the lamp on right now, given the current blink phase?
    #[inline]
    pub fn is_lit(self, blink_on: bool) -> bool {
        match self {
            LightState::AmberFlash => blink_on,
            _ => true,
        }
    }
}

/// Pedestrian head indication
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum PedState {
    Walk,
    #[default]
    DontWalk,
    /// Suppressed entirely, e.g. in safety mode
    Dark,
}

/// Site-wide blink phase at ~1 Hz for the default 500 ms half-period
///
/// Derived from the shared monotonic clock so all nodes flash together.
#[inline]
pub fn blink_on(now: Millis, blink_ms: u32) -> bool {
    (now.get() / blink_ms.max(1)) & 1 == 0
}

/// One approach's vehicle movement across the intersection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Movement {
    S2N = 0,
    S2W = 1,
    N2S = 2,
    N2W = 3,
    W2N = 4,
    W2S = 5,
}

impl Movement {
    pub const ALL: [Movement; 6] = [
        Movement::S2N,
        Movement::S2W,
        Movement::N2S,
        Movement::N2W,
        Movement::W2N,
        Movement::W2S,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Pedestrian crossing, named by the curb it serves
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Crossing {
    N1 = 0,
    S1 = 1,
    W2 = 2,
    S2 = 3,
    N2 = 4,
    W1 = 5,
}

impl Crossing {
    pub const ALL: [Crossing; 6] = [
        Crossing::N1,
        Crossing::S1,
        Crossing::W2,
        Crossing::S2,
        Crossing::N2,
        Crossing::W1,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}
