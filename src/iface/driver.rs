//! Raw frame driver boundary
//!
//! The stack only needs three operations from the link: open it, push a
//! complete Ethernet frame out, and pull one frame in without blocking.

use std::collections::VecDeque;
use std::io;

pub trait Driver {
    fn open(&mut self) -> io::Result<()>;

    /// Transmit one complete Ethernet frame
    fn send(&mut self, frame: &[u8]) -> io::Result<()>;

    /// Receive one frame into `buf`; `Ok(0)` when nothing is available
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// In-memory driver: frames are injected by hand and sent frames are recorded
#[derive(Debug, Default)]
pub struct MemoryDriver {
    inbound: VecDeque<Vec<u8>>,
    sent: Vec<Vec<u8>>,
    opened: bool,
    fail_open: bool,
    fail_send: bool,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// A driver whose `open` always fails
    pub fn failing_open() -> Self {
        MemoryDriver {
            fail_open: true,
            ..Default::default()
        }
    }

    pub fn set_fail_send(&mut self, fail: bool) {
        self.fail_send = fail;
    }

    /// Queue a frame to be returned by the next `recv`
    pub fn inject(&mut self, frame: Vec<u8>) {
        self.inbound.push_back(frame);
    }

    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    pub fn take_sent(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.sent)
    }
}

fn not_open() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "driver is not open")
}

impl Driver for MemoryDriver {
    fn open(&mut self) -> io::Result<()> {
        if self.fail_open {
            return Err(io::Error::new(io::ErrorKind::Other, "open refused"));
        }
        self.opened = true;
        Ok(())
    }

    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        if !self.opened {
            return Err(not_open());
        }
        if self.fail_send {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "send refused"));
        }
        self.sent.push(frame.to_vec());
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.opened {
            return Err(not_open());
        }
        match self.inbound.pop_front() {
            Some(frame) => {
                let n = frame.len().min(buf.len());
                buf[..n].copy_from_slice(&frame[..n]);
                Ok(n)
            }
            None => Ok(0),
        }
    }
}
