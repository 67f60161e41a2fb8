//! Ampel Runtime - Node shell and host seams
//!
//! Everything that connects the pure protocol to a host:
//! - `Transport` and `FlagStore` traits with in-memory implementations
//! - The `PeriodicTask` trait for the external scheduler
//! - `TickClock`, bridging `Instant` into protocol time
//! - `Node`, the per-controller shell wiring transport, codec,
//!   coordinator and output driver together

pub mod clock;
pub mod io;
pub mod node;
pub mod task;

pub use clock::*;
pub use io::*;
pub use node::*;
pub use task::*;
