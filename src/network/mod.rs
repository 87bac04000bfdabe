//! Network layer wire formats
//!
//! This module contains the wire formats for network layer protocols:
//! - IPv4: Internet Protocol version 4
//! - ICMP: Internet Control Message Protocol

pub mod icmp;
pub mod ipv4;

// Re-export commonly used items
pub use icmp::{IcmpCode, IcmpHeader, ICMP_HEADER_LEN, ICMP_TYPE_ECHO_REPLY, ICMP_TYPE_ECHO_REQUEST};
pub use ipv4::{flags, protocol, Ipv4Header, IPV4_HEADER_LEN};

use byteorder::{ByteOrder, NetworkEndian};

/// Calculate Internet checksum
///
/// Algorithm: Sum data in 16-bit chunks, add carry bits to the sum,
/// and return the one's complement of the result.
/// This is used for IP, ICMP and UDP checksums.
pub fn checksum(data: &[u8]) -> u16 {
    let mut sum = 0u32;

    for chunk in data.chunks_exact(2) {
        sum += NetworkEndian::read_u16(chunk) as u32;
    }

    // Odd trailing byte is padded with zero
    if data.len() % 2 != 0 {
        if let Some(&last_byte) = data.last() {
            sum += (last_byte as u32) << 8;
        }
    }

    while (sum >> 16) > 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }

    !sum as u16
}

/// Zero the 16-bit checksum field at `pos`, recompute over `data` and write it back.
pub fn fill_checksum(data: &mut [u8], pos: usize) -> u16 {
    NetworkEndian::write_u16(&mut data[pos..pos + 2], 0);
    let sum = checksum(data);
    NetworkEndian::write_u16(&mut data[pos..pos + 2], sum);
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_known_header() {
        // RFC 1071 style sample IPv4 header, checksum field zeroed
        let header = [
            0x45, 0x00, 0x00, 0x73, 0x00, 0x00, 0x40, 0x00, 0x40, 0x11, 0x00, 0x00, 0xc0, 0xa8,
            0x00, 0x01, 0xc0, 0xa8, 0x00, 0xc7,
        ];
        assert_eq!(checksum(&header), 0xb861);
    }

    #[test]
    fn test_checksum_odd_length() {
        assert_eq!(checksum(&[0x01]), !0x0100u16);
        assert_eq!(checksum(&[]), 0xFFFF);
    }

    #[test]
    fn test_fill_checksum_revalidates() {
        let samples: [&[u8]; 3] = [
            &[0x45, 0, 0, 20, 0x12, 0x34, 0, 0, 64, 1, 0xde, 0xad, 10, 0, 0, 1, 10, 0, 0, 2],
            &[0xff; 20],
            &[0x00; 20],
        ];
        for sample in samples {
            let mut header = sample.to_vec();
            let sum = fill_checksum(&mut header, 10);
            assert_eq!(NetworkEndian::read_u16(&header[10..12]), sum);
            // A header carrying its own checksum sums to zero
            assert_eq!(checksum(&header), 0);
        }
    }
}
