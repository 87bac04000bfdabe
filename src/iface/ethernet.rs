use crate::buf::PacketBuf;
use crate::error::{DropReason, Result};
use crate::iface::driver::Driver;
use crate::iface::stack::Stack;
use crate::link::{EthernetHeader, MacAddress, ETHERNET_HEADER_LEN, ETHERTYPE_ARP, ETHERTYPE_IPV4};

impl<D: Driver> Stack<D> {
    /// Demultiplex an inbound frame by EtherType
    ///
    /// IPv4 and ARP payloads are passed up with the header stripped; any
    /// other EtherType is dropped.
    pub fn ethernet_in(&mut self, mut buf: PacketBuf) -> Result<()> {
        let header = match EthernetHeader::from_bytes(buf.data()) {
            Some(header) => header,
            None => {
                self.drop_packet("ethernet", DropReason::Malformed("frame shorter than header"));
                return Ok(());
            }
        };

        log::trace!(
            "ethernet: {} -> {} type {:#06x}, {} bytes",
            header.src,
            header.dst,
            header.ethertype,
            buf.len()
        );

        match header.ethertype {
            ETHERTYPE_IPV4 => {
                buf.remove_header(ETHERNET_HEADER_LEN);
                self.ip_in(buf)
            }
            ETHERTYPE_ARP => {
                buf.remove_header(ETHERNET_HEADER_LEN);
                self.arp_in(buf)
            }
            other => {
                self.drop_packet("ethernet", DropReason::UnknownEtherType(other));
                Ok(())
            }
        }
    }

    /// Frame `buf` for `dst` and hand it to the driver
    pub fn ethernet_out(&mut self, mut buf: PacketBuf, dst: MacAddress, ethertype: u16) -> Result<()> {
        let header = EthernetHeader {
            dst,
            src: self.config.mac,
            ethertype,
        };
        header.write(buf.add_header(ETHERNET_HEADER_LEN));

        log::trace!("ethernet: sending {} bytes to {} type {:#06x}", buf.len(), dst, ethertype);
        self.driver.send(buf.data())?;
        self.stats.tx_frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::buf::PacketBuf;
    use crate::iface::stack::testing::*;
    use crate::link::ETHERTYPE_IPV4;

    #[test]
    fn test_out_prepends_header() {
        let mut stack = stack();
        stack
            .ethernet_out(PacketBuf::from_slice(&[1, 2, 3]), PEER_MAC, ETHERTYPE_IPV4)
            .unwrap();

        let sent = stack.driver().sent();
        assert_eq!(sent.len(), 1);
        let (header, payload) = split_frame(&sent[0]);
        assert_eq!(header.dst, PEER_MAC);
        assert_eq!(header.src, LOCAL_MAC);
        assert_eq!(&sent[0][12..14], &[0x08, 0x00]);
        assert_eq!(payload, &[1, 2, 3]);
        assert_eq!(stack.stats().tx_frames, 1);
    }

    #[test]
    fn test_unknown_ethertype_dropped() {
        let mut stack = stack();
        stack
            .driver_mut()
            .inject(eth_frame(LOCAL_MAC, PEER_MAC, 0x86DD, &[0u8; 40]));
        assert!(stack.poll().unwrap());
        assert_eq!(stack.stats().unknown_ethertypes, 1);
        assert!(stack.driver().sent().is_empty());
    }

    #[test]
    fn test_runt_frame_dropped() {
        let mut stack = stack();
        stack.driver_mut().inject(vec![0xFF; 10]);
        assert!(stack.poll().unwrap());
        assert_eq!(stack.stats().malformed, 1);
    }

    #[test]
    fn test_ip_and_arp_are_dispatched() {
        let mut stack = stack();
        let request = crate::link::ArpPacket::request(PEER_MAC, PEER_IP, LOCAL_IP);
        stack.driver_mut().inject(arp_frame(&request));
        stack.poll().unwrap();
        // ARP layer learned the sender
        assert_eq!(stack.arp_lookup(PEER_IP), Some(PEER_MAC));

        // A bad checksum is only noticed by the IP layer
        let mut frame = ip_frame(PEER_IP, LOCAL_IP, 17, &[0u8; 8]);
        frame[14 + 10] ^= 0xFF;
        stack.driver_mut().inject(frame);
        stack.poll().unwrap();
        assert_eq!(stack.stats().checksum_errors, 1);
    }
}
