//! IPv4 header wire format
//!
//! This module provides IPv4 header parsing, validation and serialization.
//! Processing of inbound and outbound datagrams lives in `iface::ipv4`.

use std::net::Ipv4Addr;

use crate::error::DropReason;
use crate::network::checksum;
use byteorder::{BigEndian, ByteOrder};

pub const IPV4_HEADER_LEN: usize = 20;
pub const IPV4_VERSION: u8 = 4;
const DEFAULT_IHL: u8 = 5; // 5 * 4 = 20 bytes (standard header length)
pub const DEFAULT_TTL: u8 = 64;

/// IPv4 packet header structure
///
/// Represents the standard 20-byte IPv4 header as defined in RFC 791
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4Header {
    pub version: u8,
    pub ihl: u8, // Internet Header Length
    pub tos: u8, // Type of Service
    pub total_len: u16,
    pub id: u16,
    pub flags_frag_offset: u16, // Flags and Fragment Offset
    pub ttl: u8,                // Time to Live
    pub protocol: u8,           // Next Protocol
    pub checksum: u16,
    pub src_addr: Ipv4Addr,
    pub dst_addr: Ipv4Addr,
}

impl Ipv4Header {
    /// Create an outbound header for one fragment
    ///
    /// `frag_offset` is in 8-byte units. The checksum is left at zero,
    /// serialize with [`Ipv4Header::to_bytes_with_checksum`].
    pub fn new_fragment(
        total_len: u16,
        id: u16,
        frag_offset: u16,
        more_fragments: bool,
        protocol: u8,
        src_addr: Ipv4Addr,
        dst_addr: Ipv4Addr,
    ) -> Self {
        let mut flags_frag_offset = frag_offset & flags::FRAGMENT_OFFSET_MASK;
        if more_fragments {
            flags_frag_offset |= flags::MORE_FRAGMENTS;
        }

        Ipv4Header {
            version: IPV4_VERSION,
            ihl: DEFAULT_IHL,
            tos: 0,
            total_len,
            id,
            flags_frag_offset,
            ttl: DEFAULT_TTL,
            protocol,
            checksum: 0,
            src_addr,
            dst_addr,
        }
    }

    /// Parse IPv4 header from byte slice
    ///
    /// Only checks that 20 bytes are present; field validation is
    /// done by [`Ipv4Header::validate`].
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < IPV4_HEADER_LEN {
            return None;
        }

        Some(Ipv4Header {
            version: (data[0] & 0xF0) >> 4,
            ihl: data[0] & 0x0F,
            tos: data[1],
            total_len: BigEndian::read_u16(&data[2..4]),
            id: BigEndian::read_u16(&data[4..6]),
            flags_frag_offset: BigEndian::read_u16(&data[6..8]),
            ttl: data[8],
            protocol: data[9],
            checksum: BigEndian::read_u16(&data[10..12]),
            src_addr: Ipv4Addr::new(data[12], data[13], data[14], data[15]),
            dst_addr: Ipv4Addr::new(data[16], data[17], data[18], data[19]),
        })
    }

    /// Convert IPv4 header to bytes, carrying the current checksum field as-is
    pub fn to_bytes(&self) -> [u8; IPV4_HEADER_LEN] {
        let mut bytes = [0u8; IPV4_HEADER_LEN];
        bytes[0] = (self.version << 4) | self.ihl;
        bytes[1] = self.tos;
        BigEndian::write_u16(&mut bytes[2..4], self.total_len);
        BigEndian::write_u16(&mut bytes[4..6], self.id);
        BigEndian::write_u16(&mut bytes[6..8], self.flags_frag_offset);
        bytes[8] = self.ttl;
        bytes[9] = self.protocol;
        BigEndian::write_u16(&mut bytes[10..12], self.checksum);
        bytes[12..16].copy_from_slice(&self.src_addr.octets());
        bytes[16..20].copy_from_slice(&self.dst_addr.octets());

        bytes
    }

    /// Serialize with a freshly computed header checksum
    ///
    /// The checksum field is zeroed before the sum is taken.
    pub fn to_bytes_with_checksum(&mut self) -> [u8; IPV4_HEADER_LEN] {
        self.checksum = 0;
        let mut bytes = self.to_bytes();
        self.checksum = checksum(&bytes);
        BigEndian::write_u16(&mut bytes[10..12], self.checksum);
        bytes
    }

    /// Get the header length in bytes
    pub fn header_len(&self) -> usize {
        (self.ihl as usize) * 4
    }

    /// Get payload length
    pub fn payload_len(&self) -> usize {
        (self.total_len as usize).saturating_sub(self.header_len())
    }

    /// Fragment offset in 8-byte units
    pub fn frag_offset(&self) -> u16 {
        self.flags_frag_offset & flags::FRAGMENT_OFFSET_MASK
    }

    pub fn more_fragments(&self) -> bool {
        self.flags_frag_offset & flags::MORE_FRAGMENTS != 0
    }

    /// Validate the header fields against the received datagram
    ///
    /// `datagram` must start at this header. The checksum is recomputed over
    /// `ihl * 4` bytes with the checksum field zeroed; `datagram` itself is
    /// left untouched.
    pub fn validate(&self, datagram: &[u8]) -> Result<(), DropReason> {
        if self.version != IPV4_VERSION {
            return Err(DropReason::Malformed("ip version is not 4"));
        }

        if self.ihl < DEFAULT_IHL {
            return Err(DropReason::Malformed("ip header length below 5 words"));
        }

        if (self.total_len as usize) < IPV4_HEADER_LEN {
            return Err(DropReason::Malformed("ip total length below 20"));
        }

        let header_len = self.header_len();
        if header_len > datagram.len() || (self.total_len as usize) < header_len {
            return Err(DropReason::Malformed("ip header exceeds datagram"));
        }

        if self.total_len as usize > datagram.len() {
            return Err(DropReason::Malformed("ip total length exceeds buffer"));
        }

        let mut header_bytes = datagram[..header_len].to_vec();
        header_bytes[10] = 0;
        header_bytes[11] = 0;
        if checksum(&header_bytes) != self.checksum {
            return Err(DropReason::ChecksumMismatch);
        }

        Ok(())
    }
}

/// IPv4 protocol constants
pub mod protocol {
    pub const ICMP: u8 = 1;
    pub const TCP: u8 = 6;
    pub const UDP: u8 = 17;
}

/// IPv4 flags constants
pub mod flags {
    pub const MORE_FRAGMENTS: u16 = 0x2000;
    pub const FRAGMENT_OFFSET_MASK: u16 = 0x1FFF;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Ipv4Header {
        Ipv4Header::new_fragment(
            48,
            7,
            0,
            false,
            protocol::UDP,
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 5),
        )
    }

    #[test]
    fn test_header_serialization() {
        let mut header = sample();
        let bytes = header.to_bytes_with_checksum();
        assert_eq!(bytes[0], 0x45);
        assert_eq!(&bytes[2..4], &[0, 48]);
        assert_eq!(&bytes[4..6], &[0, 7]);
        assert_eq!(&bytes[6..8], &[0, 0]);
        assert_eq!(bytes[8], DEFAULT_TTL);
        assert_eq!(bytes[9], protocol::UDP);

        let parsed = Ipv4Header::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_fragment_flags() {
        let header = Ipv4Header::new_fragment(
            1500,
            1,
            185,
            true,
            protocol::ICMP,
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 5),
        );
        assert_eq!(header.flags_frag_offset, 0x2000 | 185);
        assert_eq!(header.frag_offset(), 185);
        assert!(header.more_fragments());
    }

    #[test]
    fn test_validate_accepts_good_header() {
        let mut header = sample();
        let mut datagram = header.to_bytes_with_checksum().to_vec();
        datagram.extend_from_slice(&[0u8; 28]);
        assert_eq!(header.validate(&datagram), Ok(()));
        // Validation leaves the transmitted checksum in place
        assert_eq!(BigEndian::read_u16(&datagram[10..12]), header.checksum);
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let mut header = sample();
        let mut datagram = header.to_bytes_with_checksum().to_vec();
        datagram.extend_from_slice(&[0u8; 28]);

        let mut bad = header.clone();
        bad.version = 6;
        assert!(matches!(bad.validate(&datagram), Err(DropReason::Malformed(_))));

        let mut bad = header.clone();
        bad.ihl = 4;
        assert!(matches!(bad.validate(&datagram), Err(DropReason::Malformed(_))));

        let mut bad = header.clone();
        bad.total_len = 19;
        assert!(matches!(bad.validate(&datagram), Err(DropReason::Malformed(_))));

        let mut bad = header.clone();
        bad.total_len = 200;
        assert!(matches!(bad.validate(&datagram), Err(DropReason::Malformed(_))));
    }

    #[test]
    fn test_validate_rejects_bad_checksum() {
        let mut header = sample();
        let mut datagram = header.to_bytes_with_checksum().to_vec();
        datagram.extend_from_slice(&[0u8; 28]);
        datagram[8] = 1; // TTL changed after checksum
        let parsed = Ipv4Header::from_bytes(&datagram).unwrap();
        assert_eq!(parsed.validate(&datagram), Err(DropReason::ChecksumMismatch));
    }
}
