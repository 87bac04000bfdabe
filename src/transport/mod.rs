//! Transport layer protocols implementation
//!
//! This module contains the transport layer wire formats:
//! - UDP: User Datagram Protocol

pub mod udp;

// Re-export commonly used items
pub use udp::{UdpDatagram, UdpHeader, UdpSocket, UDP_HEADER_LEN};
