//! Ampel Wire - Message model and framing codecs
//!
//! This crate implements the coordinator's wire surface:
//! - The three-message model (Beacon, Claim, Yield)
//! - CSV-over-serial framing with an XOR checksum trailer
//! - JSON mesh framing with a tagged envelope
//! - Incremental line scanning for byte-stream transports

pub mod checksum;
pub mod mesh;
pub mod message;
pub mod scanner;
pub mod serial;

pub use checksum::*;
pub use mesh::*;
pub use message::*;
pub use scanner::*;
pub use serial::*;

use ampel_core::AmpelResult;

/// Hard cap on one encoded frame, terminator included
pub const MAX_FRAME: usize = 192;

/// Framing codec contract
///
/// Both framings render the same message model; which one is active is a
/// transport decision made at integration time, not protocol logic.
pub trait Codec {
    fn encode(&self, msg: &Message) -> AmpelResult<Vec<u8>>;
    fn decode(&self, frame: &[u8]) -> AmpelResult<Message>;
}
