use std::net::Ipv4Addr;

use crate::buf::PacketBuf;
use crate::error::{Result, StackError};
use crate::iface::driver::Driver;
use crate::iface::stack::Stack;
use crate::network::{protocol, IcmpCode, IPV4_HEADER_LEN};
use crate::transport::udp::{self, UdpDatagram, UdpSocket, UDP_HEADER_LEN};

impl<D: Driver> Stack<D> {
    pub fn udp_bind(&mut self, port: u16) -> Result<()> {
        if port == 0 {
            return Err(StackError::InvalidPort);
        }
        if self.udp_sockets.contains_key(&port) {
            return Err(StackError::PortInUse(port));
        }
        self.udp_sockets.insert(port, UdpSocket::new());
        Ok(())
    }

    /// Close the port; queued datagrams are discarded
    pub fn udp_unbind(&mut self, port: u16) -> bool {
        self.udp_sockets.remove(&port).is_some()
    }

    pub fn udp_recv(&mut self, port: u16) -> Option<UdpDatagram> {
        self.udp_sockets.get_mut(&port)?.recv()
    }

    /// Send `payload` from a bound local port
    pub fn udp_send(&mut self, src_port: u16, dst: Ipv4Addr, dst_port: u16, payload: &[u8]) -> Result<()> {
        if !self.udp_sockets.contains_key(&src_port) {
            return Err(StackError::PortNotBound(src_port));
        }
        if payload.len() + UDP_HEADER_LEN + IPV4_HEADER_LEN > u16::MAX as usize {
            return Err(StackError::PayloadTooLarge(payload.len()));
        }

        let segment = udp::build_segment(self.config.ip, dst, src_port, dst_port, payload);
        self.ip_out(PacketBuf::from_slice(&segment), dst, protocol::UDP)
    }

    /// Deliver an inbound segment to its socket
    ///
    /// `buf` starts at the UDP header, with the 20-byte IP header just in
    /// front of it. Segments for unbound ports are answered with ICMP port
    /// unreachable quoting the original datagram.
    pub fn udp_in(&mut self, mut buf: PacketBuf, src: Ipv4Addr) -> Result<()> {
        let header = match udp::validate(src, self.config.ip, buf.data()) {
            Ok(header) => header,
            Err(reason) => {
                self.drop_packet("udp", reason);
                return Ok(());
            }
        };

        match self.udp_sockets.get_mut(&header.dst_port) {
            Some(socket) => {
                log::trace!(
                    "udp: {}:{} -> port {}, {} bytes",
                    src,
                    header.src_port,
                    header.dst_port,
                    buf.len() - UDP_HEADER_LEN
                );
                socket.enqueue(UdpDatagram {
                    src_addr: src,
                    src_port: header.src_port,
                    payload: buf.data()[UDP_HEADER_LEN..].to_vec(),
                });
                Ok(())
            }
            None => {
                log::debug!("udp: no socket on port {}", header.dst_port);
                buf.add_header(IPV4_HEADER_LEN);
                self.icmp_unreachable(buf.data(), src, IcmpCode::PortUnreachable)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::StackError;
    use crate::iface::stack::testing::*;
    use crate::network::{checksum, protocol, IcmpHeader, Ipv4Header};
    use crate::transport::udp::{build_segment, validate};

    #[test]
    fn test_bind_rules() {
        let mut stack = stack();
        assert!(matches!(stack.udp_bind(0), Err(StackError::InvalidPort)));
        stack.udp_bind(7).unwrap();
        assert!(matches!(stack.udp_bind(7), Err(StackError::PortInUse(7))));
        assert!(stack.udp_unbind(7));
        assert!(!stack.udp_unbind(7));
    }

    #[test]
    fn test_datagram_delivered_to_bound_port() {
        let mut stack = stack();
        stack.udp_bind(7).unwrap();
        let segment = build_segment(PEER_IP, LOCAL_IP, 4000, 7, b"ping");
        stack
            .driver_mut()
            .inject(ip_frame(PEER_IP, LOCAL_IP, protocol::UDP, &segment));
        stack.poll().unwrap();

        let datagram = stack.udp_recv(7).unwrap();
        assert_eq!(datagram.src_addr, PEER_IP);
        assert_eq!(datagram.src_port, 4000);
        assert_eq!(datagram.payload, b"ping");
        assert!(stack.udp_recv(7).is_none());
    }

    #[test]
    fn test_corrupt_datagram_dropped() {
        let mut stack = stack();
        stack.udp_bind(7).unwrap();
        let mut segment = build_segment(PEER_IP, LOCAL_IP, 4000, 7, b"ping");
        segment[8] ^= 0x01;
        stack
            .driver_mut()
            .inject(ip_frame(PEER_IP, LOCAL_IP, protocol::UDP, &segment));
        stack.poll().unwrap();
        assert!(stack.udp_recv(7).is_none());
        assert_eq!(stack.stats().checksum_errors, 1);
    }

    #[test]
    fn test_unbound_port_gets_port_unreachable() {
        let mut stack = stack();
        stack.arp_update(PEER_IP, PEER_MAC);
        let segment = build_segment(PEER_IP, LOCAL_IP, 4000, 9999, b"anyone?");
        let datagram = ip_datagram(PEER_IP, LOCAL_IP, protocol::UDP, &segment);
        stack
            .driver_mut()
            .inject(ip_frame(PEER_IP, LOCAL_IP, protocol::UDP, &segment));
        stack.poll().unwrap();

        let sent = stack.driver().sent();
        assert_eq!(sent.len(), 1);
        let (_, reply) = split_frame(&sent[0]);
        let message = &reply[20..];
        let icmp = IcmpHeader::from_bytes(message).unwrap();
        assert_eq!((icmp.msg_type, icmp.msg_code), (3, 3));
        assert_eq!(&message[8..], &datagram[..28]);
        assert_eq!(checksum(message), 0);
    }

    #[test]
    fn test_send_requires_bound_port() {
        let mut stack = stack();
        assert!(matches!(
            stack.udp_send(5000, PEER_IP, 7, b"x"),
            Err(StackError::PortNotBound(5000))
        ));
    }

    #[test]
    fn test_send_builds_checksummed_segment() {
        let mut stack = stack();
        stack.arp_update(PEER_IP, PEER_MAC);
        stack.udp_bind(5000).unwrap();
        stack.udp_send(5000, PEER_IP, 7, b"hello").unwrap();

        let (_, datagram) = split_frame(&stack.driver().sent()[0]);
        let ip = Ipv4Header::from_bytes(datagram).unwrap();
        assert_eq!(ip.protocol, protocol::UDP);
        let header = validate(LOCAL_IP, PEER_IP, &datagram[20..]).unwrap();
        assert_eq!((header.src_port, header.dst_port), (5000, 7));
        assert_eq!(&datagram[28..], b"hello");
    }
}
