//! Error types
//!
//! `StackError` is what operations return to the caller. `DropReason`
//! explains a silently dropped packet; it is logged and counted but never
//! surfaced as an error.

use std::fmt;
use std::io;

/// Errors returned to the caller of a stack operation
#[derive(Debug)]
pub enum StackError {
    /// The link-layer driver failed to open, send or receive
    Driver(io::Error),
    /// Payload does not fit a single IPv4 datagram
    PayloadTooLarge(usize),
    /// Port 0 cannot be bound
    InvalidPort,
    /// A socket is already bound to the port
    PortInUse(u16),
    /// No socket is bound to the port
    PortNotBound(u16),
}

impl fmt::Display for StackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackError::Driver(e) => write!(f, "driver error: {}", e),
            StackError::PayloadTooLarge(len) => {
                write!(f, "payload of {} bytes exceeds the IPv4 datagram limit", len)
            }
            StackError::InvalidPort => write!(f, "invalid port 0"),
            StackError::PortInUse(port) => write!(f, "port {} already bound", port),
            StackError::PortNotBound(port) => write!(f, "port {} is not bound", port),
        }
    }
}

impl std::error::Error for StackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StackError::Driver(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StackError {
    fn from(e: io::Error) -> Self {
        StackError::Driver(e)
    }
}

pub type Result<T> = std::result::Result<T, StackError>;

/// Why an inbound packet was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Truncated packet or unexpected header field
    Malformed(&'static str),
    ChecksumMismatch,
    /// IP destination is not the local address
    AddressMismatch,
    UnknownEtherType(u16),
    /// Well-formed but uses a feature this stack does not implement
    Unsupported(&'static str),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::Malformed(what) => write!(f, "malformed packet: {}", what),
            DropReason::ChecksumMismatch => write!(f, "checksum mismatch"),
            DropReason::AddressMismatch => write!(f, "destination is not the local address"),
            DropReason::UnknownEtherType(t) => write!(f, "unknown ethertype {:#06x}", t),
            DropReason::Unsupported(what) => write!(f, "unsupported: {}", what),
        }
    }
}

/// Error parsing a colon-separated MAC address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMacError(pub String);

impl fmt::Display for ParseMacError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid MAC address: {}", self.0)
    }
}

impl std::error::Error for ParseMacError {}
