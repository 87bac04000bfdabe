//! UDP (User Datagram Protocol) wire format and sockets
//!
//! This module provides UDP header parsing, pseudo-header checksums and the
//! per-port receive queue. Demultiplexing lives in `iface::udp`.

use std::collections::VecDeque;
use std::net::Ipv4Addr;

use crate::error::DropReason;
use crate::network::{checksum, protocol};
use byteorder::{BigEndian, ByteOrder};

/// UDP header length in bytes
pub const UDP_HEADER_LEN: usize = 8;

/// UDP packet header structure
///
/// Represents the standard 8-byte UDP header as defined in RFC 768
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    pub length: u16, // Length of UDP header and data
    pub checksum: u16,
}

impl UdpHeader {
    /// Parse UDP header from byte slice
    ///
    /// Returns None if the data is too short to contain a valid UDP header
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < UDP_HEADER_LEN {
            return None;
        }

        Some(UdpHeader {
            src_port: BigEndian::read_u16(&data[0..2]),
            dst_port: BigEndian::read_u16(&data[2..4]),
            length: BigEndian::read_u16(&data[4..6]),
            checksum: BigEndian::read_u16(&data[6..8]),
        })
    }

    /// Convert UDP header to bytes
    pub fn to_bytes(&self) -> [u8; UDP_HEADER_LEN] {
        let mut bytes = [0u8; UDP_HEADER_LEN];
        BigEndian::write_u16(&mut bytes[0..2], self.src_port);
        BigEndian::write_u16(&mut bytes[2..4], self.dst_port);
        BigEndian::write_u16(&mut bytes[4..6], self.length);
        BigEndian::write_u16(&mut bytes[6..8], self.checksum);
        bytes
    }
}

/// A received datagram, waiting in a socket's queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdpDatagram {
    pub src_addr: Ipv4Addr,
    pub src_port: u16,
    pub payload: Vec<u8>,
}

/// Receive side of a bound port
#[derive(Debug, Default)]
pub struct UdpSocket {
    rx_queue: VecDeque<UdpDatagram>,
}

impl UdpSocket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a datagram that has arrived for this socket.
    pub(crate) fn enqueue(&mut self, datagram: UdpDatagram) {
        self.rx_queue.push_back(datagram);
    }

    /// Dequeues a datagram for the application to process.
    pub fn recv(&mut self) -> Option<UdpDatagram> {
        self.rx_queue.pop_front()
    }

    pub fn has_datagram(&self) -> bool {
        !self.rx_queue.is_empty()
    }
}

/// Checksum over the IPv4 pseudo header and the whole UDP segment
///
/// The segment's own checksum field is included as-is, so a received
/// segment with a correct checksum sums to zero.
pub fn pseudo_header_checksum(src_ip: Ipv4Addr, dst_ip: Ipv4Addr, segment: &[u8]) -> u16 {
    // src_ip(4) + dst_ip(4) + zero(1) + protocol(1) + udp_len(2) = 12 bytes
    let mut pseudo = Vec::with_capacity(12 + segment.len());
    pseudo.extend_from_slice(&src_ip.octets());
    pseudo.extend_from_slice(&dst_ip.octets());
    pseudo.push(0);
    pseudo.push(protocol::UDP);
    pseudo.extend_from_slice(&(segment.len() as u16).to_be_bytes());
    pseudo.extend_from_slice(segment);

    checksum(&pseudo)
}

/// Validate length and (non-zero) checksum of a received segment
pub fn validate(src_ip: Ipv4Addr, dst_ip: Ipv4Addr, segment: &[u8]) -> Result<UdpHeader, DropReason> {
    let header = UdpHeader::from_bytes(segment).ok_or(DropReason::Malformed("udp segment too short"))?;

    if (header.length as usize) < UDP_HEADER_LEN || header.length as usize != segment.len() {
        return Err(DropReason::Malformed("udp length disagrees with ip payload"));
    }

    if header.checksum != 0 && pseudo_header_checksum(src_ip, dst_ip, segment) != 0 {
        return Err(DropReason::ChecksumMismatch);
    }

    Ok(header)
}

/// Build a UDP segment with its checksum filled in
pub fn build_segment(
    src_ip: Ipv4Addr,
    dst_ip: Ipv4Addr,
    src_port: u16,
    dst_port: u16,
    payload: &[u8],
) -> Vec<u8> {
    let total_len = UDP_HEADER_LEN + payload.len();
    let header = UdpHeader {
        src_port,
        dst_port,
        length: total_len as u16,
        checksum: 0,
    };

    let mut segment = Vec::with_capacity(total_len);
    segment.extend_from_slice(&header.to_bytes());
    segment.extend_from_slice(payload);

    let mut sum = pseudo_header_checksum(src_ip, dst_ip, &segment);
    // Zero means "no checksum" in UDP, send all-ones instead
    if sum == 0 {
        sum = 0xFFFF;
    }
    BigEndian::write_u16(&mut segment[6..8], sum);

    segment
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
    const DST: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);

    #[test]
    fn test_built_segment_validates() {
        let segment = build_segment(SRC, DST, 4000, 7, b"hello");
        let header = validate(SRC, DST, &segment).unwrap();
        assert_eq!(header.src_port, 4000);
        assert_eq!(header.dst_port, 7);
        assert_eq!(header.length, 13);
        assert_eq!(&segment[8..], b"hello");
    }

    #[test]
    fn test_corrupt_segment_rejected() {
        let mut segment = build_segment(SRC, DST, 4000, 7, b"hello");
        segment[9] ^= 0xFF;
        assert_eq!(validate(SRC, DST, &segment), Err(DropReason::ChecksumMismatch));

        let segment = build_segment(SRC, DST, 4000, 7, b"hello");
        assert!(matches!(
            validate(SRC, DST, &segment[..10]),
            Err(DropReason::Malformed(_))
        ));
    }

    #[test]
    fn test_zero_checksum_skips_verification() {
        let mut segment = build_segment(SRC, DST, 1, 2, b"x");
        segment[6] = 0;
        segment[7] = 0;
        assert!(validate(SRC, DST, &segment).is_ok());
    }

    #[test]
    fn test_socket_queue_order() {
        let mut socket = UdpSocket::new();
        assert!(!socket.has_datagram());
        for n in 0..3u8 {
            socket.enqueue(UdpDatagram {
                src_addr: SRC,
                src_port: 9,
                payload: vec![n],
            });
        }
        assert!(socket.has_datagram());
        assert_eq!(socket.recv().unwrap().payload, vec![0]);
        assert_eq!(socket.recv().unwrap().payload, vec![1]);
    }
}
