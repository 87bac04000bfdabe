use std::net::Ipv4Addr;

use crate::buf::PacketBuf;
use crate::error::{DropReason, Result};
use crate::iface::driver::Driver;
use crate::iface::stack::Stack;
use crate::network::icmp::ICMP_UNREACHABLE_QUOTE_LEN;
use crate::network::{
    fill_checksum, protocol, IcmpCode, IcmpHeader, ICMP_HEADER_LEN, ICMP_TYPE_ECHO_REPLY,
    IPV4_HEADER_LEN,
};

/// Offset of the checksum field in the ICMP header
const ICMP_CHECKSUM_POS: usize = 2;

impl<D: Driver> Stack<D> {
    /// Answer echo requests; every other ICMP type is ignored
    pub fn icmp_in(&mut self, buf: PacketBuf, src: Ipv4Addr) -> Result<()> {
        let header = match IcmpHeader::from_bytes(buf.data()) {
            Some(header) => header,
            None => {
                self.drop_packet("icmp", DropReason::Malformed("message shorter than 8 bytes"));
                return Ok(());
            }
        };

        if !header.is_echo_request() {
            log::trace!("icmp: ignoring type {} from {}", header.msg_type, src);
            return Ok(());
        }

        let (id, seq) = header.echo_fields();
        log::debug!("icmp: echo request from {} id {} seq {}, replying", src, id, seq);

        // The reply is the request with a new type and checksum
        let mut reply = buf;
        let data = reply.data_mut();
        data[0] = ICMP_TYPE_ECHO_REPLY;
        fill_checksum(data, ICMP_CHECKSUM_POS);

        self.ip_out(reply, src, protocol::ICMP)
    }

    /// Report `received` (an IP datagram starting at its header) as undeliverable
    ///
    /// The message quotes the datagram's IP header and the first 8 bytes of
    /// its payload; a shorter datagram is quoted whole and zero-padded.
    pub fn icmp_unreachable(&mut self, received: &[u8], dst: Ipv4Addr, code: IcmpCode) -> Result<()> {
        let quote_len = IPV4_HEADER_LEN + ICMP_UNREACHABLE_QUOTE_LEN;
        let mut buf = PacketBuf::new(ICMP_HEADER_LEN + quote_len);
        let data = buf.data_mut();

        data[..ICMP_HEADER_LEN].copy_from_slice(&IcmpHeader::unreachable(code).to_bytes());
        let quoted = received.len().min(quote_len);
        data[ICMP_HEADER_LEN..ICMP_HEADER_LEN + quoted].copy_from_slice(&received[..quoted]);
        fill_checksum(data, ICMP_CHECKSUM_POS);

        log::debug!("icmp: {:?} to {}", code, dst);
        self.ip_out(buf, dst, protocol::ICMP)
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use crate::iface::stack::testing::*;
    use crate::network::{checksum, protocol, IcmpCode, IcmpHeader, Ipv4Header};

    fn echo_request(id: u16, seq: u16, payload: &[u8]) -> Vec<u8> {
        let mut rest = [0u8; 4];
        rest[..2].copy_from_slice(&id.to_be_bytes());
        rest[2..].copy_from_slice(&seq.to_be_bytes());
        let header = IcmpHeader {
            msg_type: 8,
            msg_code: 0,
            checksum: 0,
            rest,
        };
        let mut message = header.to_bytes().to_vec();
        message.extend_from_slice(payload);
        let sum = checksum(&message);
        message[2..4].copy_from_slice(&sum.to_be_bytes());
        message
    }

    #[test]
    fn test_echo_request_answered() {
        let source = Ipv4Addr::new(10, 0, 0, 9);
        let mut stack = stack();
        stack.arp_update(source, PEER_MAC);

        let request = echo_request(1, 1, &[0xde, 0xad, 0xbe, 0xef]);
        stack
            .driver_mut()
            .inject(ip_frame(source, LOCAL_IP, protocol::ICMP, &request));
        stack.poll().unwrap();

        let sent = stack.driver().sent();
        assert_eq!(sent.len(), 1);
        let (eth, datagram) = split_frame(&sent[0]);
        assert_eq!(eth.dst, PEER_MAC);

        let ip = Ipv4Header::from_bytes(datagram).unwrap();
        assert_eq!(ip.protocol, protocol::ICMP);
        assert_eq!(ip.dst_addr, source);
        assert_eq!(ip.src_addr, LOCAL_IP);

        let reply = &datagram[20..];
        assert_eq!(reply.len(), request.len());
        assert_eq!(reply[0], 0);
        assert_eq!(reply[1], request[1]);
        assert_eq!(&reply[4..], &request[4..]);
        assert_eq!(checksum(reply), 0);
    }

    #[test]
    fn test_other_types_ignored() {
        let mut stack = stack();
        stack.arp_update(PEER_IP, PEER_MAC);
        let mut reply = echo_request(1, 1, &[]);
        reply[0] = 0;
        stack
            .driver_mut()
            .inject(ip_frame(PEER_IP, LOCAL_IP, protocol::ICMP, &reply));
        stack.poll().unwrap();
        assert!(stack.driver().sent().is_empty());
    }

    #[test]
    fn test_truncated_icmp_dropped() {
        let mut stack = stack();
        stack
            .driver_mut()
            .inject(ip_frame(PEER_IP, LOCAL_IP, protocol::ICMP, &[8, 0, 0]));
        stack.poll().unwrap();
        assert_eq!(stack.stats().malformed, 1);
        assert!(stack.driver().sent().is_empty());
    }

    #[test]
    fn test_unreachable_quotes_short_datagram() {
        let mut stack = stack();
        stack.arp_update(PEER_IP, PEER_MAC);
        let original = ip_datagram(PEER_IP, LOCAL_IP, 50, &[1, 2, 3]);
        stack
            .icmp_unreachable(&original, PEER_IP, IcmpCode::HostUnreachable)
            .unwrap();

        let (_, datagram) = split_frame(&stack.driver().sent()[0]);
        let message = &datagram[20..];
        assert_eq!(message.len(), 36);
        assert_eq!(&message[0..2], &[3, 1]);
        assert_eq!(&message[8..31], &original[..]);
        assert_eq!(&message[31..], &[0u8; 5]);
        assert_eq!(checksum(message), 0);
    }
}
