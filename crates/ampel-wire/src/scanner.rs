//! Incremental line extraction for byte-stream transports
//!
//! UART reception hands the node arbitrary chunks. The scanner accumulates
//! them and yields complete newline-terminated lines, dropping anything that
//! overruns the per-line cap and resynchronizing at the next delimiter.

use bytes::{Bytes, BytesMut};

use crate::MAX_FRAME;

/// Newline-delimited frame scanner with a hard per-line cap
#[derive(Debug, Default)]
pub struct LineScanner {
    buf: BytesMut,
    /// Set while skipping the tail of an overlong line
    discarding: bool,
    dropped: u64,
}

impl LineScanner {
    pub fn new() -> Self {
        LineScanner::default()
    }

    /// Feed a received chunk into the scanner
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Pull the next complete line, terminator included
    pub fn next_line(&mut self) -> Option<Bytes> {
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                let line = self.buf.split_to(pos + 1);
                if self.discarding {
                    self.discarding = false;
                    continue;
                }
                if line.len() > MAX_FRAME {
                    self.dropped += 1;
                    continue;
                }
                return Some(line.freeze());
            }
            if self.buf.len() > MAX_FRAME {
                // No terminator within the cap: drop and resync
                self.buf.clear();
                self.discarding = true;
                self.dropped += 1;
            }
            return None;
        }
    }

    /// Lines dropped to the length cap so far
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Bytes waiting for a terminator
    #[inline]
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}
