//! Packet buffer with header headroom
//!
//! Each layer prepends or strips its header in place. A buffer is owned by
//! exactly one call chain at a time and moves down the stack by value.

/// Headroom reserved in front of fresh buffers: Ethernet + IPv4 + room for options
const DEFAULT_HEADROOM: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketBuf {
    storage: Vec<u8>,
    head: usize,
}

impl PacketBuf {
    /// Zero-filled buffer of `len` bytes
    pub fn new(len: usize) -> Self {
        PacketBuf {
            storage: vec![0u8; DEFAULT_HEADROOM + len],
            head: DEFAULT_HEADROOM,
        }
    }

    pub fn from_slice(data: &[u8]) -> Self {
        let mut buf = Self::new(0);
        buf.storage.extend_from_slice(data);
        buf
    }

    pub fn data(&self) -> &[u8] {
        &self.storage[self.head..]
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.storage[self.head..]
    }

    pub fn len(&self) -> usize {
        self.storage.len() - self.head
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Prepend `len` bytes and return the new header region
    ///
    /// The region holds whatever bytes were there before, so a header
    /// stripped by [`PacketBuf::remove_header`] reappears unchanged.
    pub fn add_header(&mut self, len: usize) -> &mut [u8] {
        if len > self.head {
            let grow = len - self.head + DEFAULT_HEADROOM;
            let mut storage = vec![0u8; grow];
            storage.extend_from_slice(&self.storage);
            self.storage = storage;
            self.head += grow;
        }
        self.head -= len;
        &mut self.storage[self.head..self.head + len]
    }

    /// Strip `len` bytes from the front, at most the whole buffer
    pub fn remove_header(&mut self, len: usize) {
        self.head += len.min(self.len());
    }

    /// Shorten the buffer to `len` bytes; no effect if already shorter
    pub fn truncate(&mut self, len: usize) {
        if len < self.len() {
            self.storage.truncate(self.head + len);
        }
    }
}
