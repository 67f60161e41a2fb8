//! Transport and storage seams
//!
//! The protocol core never touches a radio, a UART or flash directly; it is
//! handed these traits at construction. The in-memory implementations back
//! the unit tests and the simulated cluster.

use std::collections::VecDeque;

/// Best-effort broadcast transport
///
/// No delivery guarantee, no ordering guarantee across nodes. `poll` must be
/// finite per tick and restartable every tick; a datagram transport yields
/// whole frames, a byte-stream transport yields arbitrary chunks.
pub trait Transport {
    fn broadcast(&mut self, frame: &[u8]);
    fn poll(&mut self) -> Option<Vec<u8>>;
}

/// Persistent one-word flag store
///
/// Used by the surrounding power-monitoring modules to remember state across
/// reboots. The protocol core does not read it; a failed write is logged by
/// the caller and retried on the next edge.
pub trait FlagStore {
    fn get(&self) -> u32;
    fn write(&mut self, value: u32) -> bool;
}

/// In-memory transport with externally injectable reception
#[derive(Debug, Default)]
pub struct QueueTransport {
    incoming: VecDeque<Vec<u8>>,
    sent: Vec<Vec<u8>>,
}

impl QueueTransport {
    pub fn new() -> Self {
        QueueTransport::default()
    }

    /// Deliver a buffer to this transport's receive side
    pub fn inject(&mut self, buf: impl Into<Vec<u8>>) {
        self.incoming.push_back(buf.into());
    }

    /// Everything broadcast so far, oldest first
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    pub fn take_sent(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.sent)
    }
}

impl Transport for QueueTransport {
    fn broadcast(&mut self, frame: &[u8]) {
        self.sent.push(frame.to_vec());
    }

    fn poll(&mut self) -> Option<Vec<u8>> {
        self.incoming.pop_front()
    }
}

/// Volatile flag store with a switchable failure mode for tests
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    value: u32,
    pub fail_writes: bool,
}

impl MemoryFlagStore {
    pub fn new(value: u32) -> Self {
        MemoryFlagStore {
            value,
            fail_writes: false,
        }
    }
}

impl FlagStore for MemoryFlagStore {
    fn get(&self) -> u32 {
        self.value
    }

    fn write(&mut self, value: u32) -> bool {
        if self.fail_writes {
            return false;
        }
        self.value = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_transport_fifo() {
        let mut t = QueueTransport::new();
        t.inject(b"one".to_vec());
        t.inject(b"two".to_vec());
        assert_eq!(t.poll().as_deref(), Some(b"one".as_slice()));
        assert_eq!(t.poll().as_deref(), Some(b"two".as_slice()));
        assert_eq!(t.poll(), None);
    }

    #[test]
    fn test_flag_store_write_failure_leaves_value() {
        let mut store = MemoryFlagStore::new(7);
        store.fail_writes = true;
        assert!(!store.write(9));
        assert_eq!(store.get(), 7);
        store.fail_writes = false;
        assert!(store.write(9));
        assert_eq!(store.get(), 9);
    }
}
