use std::net::Ipv4Addr;

use crate::buf::PacketBuf;
use crate::error::{DropReason, Result, StackError};
use crate::iface::driver::Driver;
use crate::iface::stack::Stack;
use crate::link::ETHERTYPE_IPV4;
use crate::network::{protocol, IcmpCode, Ipv4Header, IPV4_HEADER_LEN};

impl<D: Driver> Stack<D> {
    /// Validate an inbound datagram and dispatch it by protocol
    ///
    /// Only unfragmented datagrams without options addressed to the local IP
    /// are accepted. UDP and ICMP go up with the header stripped; any other
    /// protocol is answered with ICMP protocol unreachable.
    pub fn ip_in(&mut self, mut buf: PacketBuf) -> Result<()> {
        let header = match Ipv4Header::from_bytes(buf.data()) {
            Some(header) => header,
            None => {
                self.drop_packet("ip", DropReason::Malformed("datagram shorter than 20 bytes"));
                return Ok(());
            }
        };

        if let Err(reason) = header.validate(buf.data()) {
            self.drop_packet("ip", reason);
            return Ok(());
        }

        if header.header_len() != IPV4_HEADER_LEN {
            self.drop_packet("ip", DropReason::Unsupported("ip options"));
            return Ok(());
        }

        if header.dst_addr != self.config.ip {
            self.drop_packet("ip", DropReason::AddressMismatch);
            return Ok(());
        }

        if header.more_fragments() || header.frag_offset() != 0 {
            self.drop_packet("ip", DropReason::Unsupported("fragment reassembly"));
            return Ok(());
        }

        // Drop link-layer padding past the datagram
        buf.truncate(header.total_len as usize);

        let src = header.src_addr;
        log::trace!(
            "ip: {} -> {} proto {} len {}",
            src,
            header.dst_addr,
            header.protocol,
            header.total_len
        );

        match header.protocol {
            protocol::UDP => {
                buf.remove_header(IPV4_HEADER_LEN);
                self.udp_in(buf, src)
            }
            protocol::ICMP => {
                buf.remove_header(IPV4_HEADER_LEN);
                self.icmp_in(buf, src)
            }
            other => {
                log::debug!("ip: protocol {} from {} unsupported", other, src);
                self.icmp_unreachable(buf.data(), src, IcmpCode::ProtocolUnreachable)
            }
        }
    }

    /// Prepend an IPv4 header to one fragment and pass it to ARP
    ///
    /// `offset` is in 8-byte units. A fragment that does not fit the 16-bit
    /// total length field is rejected.
    pub fn ip_fragment_out(
        &mut self,
        mut buf: PacketBuf,
        dst: Ipv4Addr,
        protocol: u8,
        id: u16,
        offset: u16,
        more_fragments: bool,
    ) -> Result<()> {
        let total_len = u16::try_from(buf.len() + IPV4_HEADER_LEN)
            .map_err(|_| StackError::PayloadTooLarge(buf.len()))?;
        let mut header = Ipv4Header::new_fragment(
            total_len,
            id,
            offset,
            more_fragments,
            protocol,
            self.config.ip,
            dst,
        );
        let bytes = header.to_bytes_with_checksum();
        buf.add_header(IPV4_HEADER_LEN).copy_from_slice(&bytes);

        self.arp_out(buf, dst, ETHERTYPE_IPV4)
    }

    /// Send `buf` to `dst`, fragmenting to the MTU
    ///
    /// All fragments share one identifier; the counter advances once per
    /// call, after the fragments have been handed down.
    pub fn ip_out(&mut self, buf: PacketBuf, dst: Ipv4Addr, protocol: u8) -> Result<()> {
        if buf.len() + IPV4_HEADER_LEN > u16::MAX as usize {
            return Err(StackError::PayloadTooLarge(buf.len()));
        }

        let id = self.ip_id;
        let result = self.emit_fragments(buf, dst, protocol, id);
        self.ip_id = self.ip_id.wrapping_add(1);
        result
    }

    /// Largest fragment payload: MTU minus header, rounded down to 8 bytes
    fn max_fragment_payload(&self) -> usize {
        (self.config.mtu - IPV4_HEADER_LEN) & !7
    }

    fn emit_fragments(&mut self, buf: PacketBuf, dst: Ipv4Addr, protocol: u8, id: u16) -> Result<()> {
        let max_payload = self.max_fragment_payload();
        if buf.len() <= max_payload {
            return self.ip_fragment_out(buf, dst, protocol, id, 0, false);
        }

        let data = buf.data();
        log::debug!(
            "ip: fragmenting {} bytes to {} into {} pieces",
            data.len(),
            dst,
            (data.len() + max_payload - 1) / max_payload
        );

        let mut start = 0;
        while start < data.len() {
            let end = (start + max_payload).min(data.len());
            let fragment = PacketBuf::from_slice(&data[start..end]);
            let more_fragments = end < data.len();
            self.ip_fragment_out(fragment, dst, protocol, id, (start / 8) as u16, more_fragments)?;
            start = end;
        }

        Ok(())
    }
}
