//! Ampel Signals - Output driver
//!
//! Pure mapping from phase state to lamp indications:
//! - Vehicle and pedestrian head states with the shared blink phase
//! - Per-case signal plans as deployment data
//! - The intersection image builder and the per-node status head

pub mod driver;
pub mod light;
pub mod plan;

pub use driver::*;
pub use light::*;
pub use plan::*;
