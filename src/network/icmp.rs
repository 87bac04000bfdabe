//! ICMP (Internet Control Message Protocol) wire format
//!
//! This module provides ICMP header parsing and the message types this stack
//! answers or generates: Echo Request/Reply and Destination Unreachable.

use byteorder::{BigEndian, ByteOrder};

/// ICMP header length in bytes
pub const ICMP_HEADER_LEN: usize = 8;

/// Bytes of the offending datagram's payload quoted after its IP header
pub const ICMP_UNREACHABLE_QUOTE_LEN: usize = 8;

/// ICMP message types
pub const ICMP_TYPE_ECHO_REPLY: u8 = 0;
pub const ICMP_TYPE_UNREACHABLE: u8 = 3;
pub const ICMP_TYPE_ECHO_REQUEST: u8 = 8;

/// Destination Unreachable codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum IcmpCode {
    NetUnreachable = 0,
    HostUnreachable = 1,
    ProtocolUnreachable = 2,
    PortUnreachable = 3,
}

/// ICMP packet header structure
///
/// Represents the standard 8-byte ICMP header as defined in RFC 792
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcmpHeader {
    pub msg_type: u8,  // ICMP message type
    pub msg_code: u8,  // ICMP message code
    pub checksum: u16, // ICMP checksum
    pub rest: [u8; 4], // Type-specific data (e.g., identifier and sequence for echo)
}

impl IcmpHeader {
    /// Build a Destination Unreachable header, checksum still zero
    pub fn unreachable(code: IcmpCode) -> Self {
        IcmpHeader {
            msg_type: ICMP_TYPE_UNREACHABLE,
            msg_code: code as u8,
            checksum: 0,
            rest: [0; 4],
        }
    }

    /// Parse ICMP header from byte slice
    ///
    /// Returns None if the data is too short to contain a valid ICMP header
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < ICMP_HEADER_LEN {
            return None;
        }

        let mut rest = [0u8; 4];
        rest.copy_from_slice(&data[4..8]);

        Some(IcmpHeader {
            msg_type: data[0],
            msg_code: data[1],
            checksum: BigEndian::read_u16(&data[2..4]),
            rest,
        })
    }

    /// Convert ICMP header to bytes
    pub fn to_bytes(&self) -> [u8; ICMP_HEADER_LEN] {
        let mut bytes = [0u8; ICMP_HEADER_LEN];
        bytes[0] = self.msg_type;
        bytes[1] = self.msg_code;
        BigEndian::write_u16(&mut bytes[2..4], self.checksum);
        bytes[4..8].copy_from_slice(&self.rest);
        bytes
    }

    /// Check if this is an Echo Request message
    pub fn is_echo_request(&self) -> bool {
        self.msg_type == ICMP_TYPE_ECHO_REQUEST
    }

    /// Identifier and sequence number of an echo message
    pub fn echo_fields(&self) -> (u16, u16) {
        (BigEndian::read_u16(&self.rest[..2]), BigEndian::read_u16(&self.rest[2..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_fields() {
        let bytes = [ICMP_TYPE_ECHO_REQUEST, 0, 0, 0, 0x12, 0x34, 0, 9];
        let parsed = IcmpHeader::from_bytes(&bytes).unwrap();
        assert!(parsed.is_echo_request());
        assert_eq!(parsed.echo_fields(), (0x1234, 9));
        assert_eq!(parsed.to_bytes(), bytes);
    }

    #[test]
    fn test_short_header_rejected() {
        assert!(IcmpHeader::from_bytes(&[8, 0, 0, 0, 0, 1, 0]).is_none());
    }

    #[test]
    fn test_unreachable_header() {
        let header = IcmpHeader::unreachable(IcmpCode::PortUnreachable);
        assert_eq!(header.to_bytes(), [3, 3, 0, 0, 0, 0, 0, 0]);
    }
}
