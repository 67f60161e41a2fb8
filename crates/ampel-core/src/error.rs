//! Error types for the ampel workspace

use thiserror::Error;

/// Workspace-wide error type
///
/// Every variant here is a recoverable condition: a bad frame is dropped and
/// the protocol waits for the next valid one. Nothing in the coordinator is
/// fatal.
#[derive(Error, Debug)]
pub enum AmpelError {
    // Wire errors
    #[error("frame too long: {len} bytes (cap {max})")]
    FrameTooLong { len: usize, max: usize },

    #[error("truncated frame")]
    TruncatedFrame,

    #[error("checksum mismatch: computed {computed:02X}, transmitted {transmitted:02X}")]
    ChecksumMismatch { computed: u8, transmitted: u8 },

    #[error("unknown message kind: 0x{0:02X}")]
    UnknownKind(u8),

    #[error("bad field count for '{kind}': {got}")]
    BadFieldCount { kind: char, got: usize },

    #[error("bad field {field}: {value:?}")]
    BadField {
        field: &'static str,
        value: String,
    },

    #[error("bad phase flag: {0}")]
    BadPhaseFlag(u8),

    #[error("bad json frame: {0}")]
    BadJson(String),
}

/// Result type for ampel operations
pub type AmpelResult<T> = Result<T, AmpelError>;
