use std::net::Ipv4Addr;
use std::time::Instant;

use crate::buf::PacketBuf;
use crate::error::{DropReason, Result};
use crate::iface::driver::Driver;
use crate::iface::stack::Stack;
use crate::link::{ArpOperation, ArpPacket, MacAddress, PendingPacket, ETHERTYPE_ARP};

impl<D: Driver> Stack<D> {
    /// Invalidate the whole table, empty the hold slot and announce ourselves
    pub fn arp_init(&mut self) -> Result<()> {
        self.arp_table.clear();
        self.pending = None;
        self.arp_request(self.config.ip)
    }

    pub fn arp_lookup(&self, ip: Ipv4Addr) -> Option<MacAddress> {
        self.arp_table.lookup(ip)
    }

    /// Learn `ip -> mac` now
    pub fn arp_update(&mut self, ip: Ipv4Addr, mac: MacAddress) {
        self.arp_table.update(ip, mac, Instant::now());
    }

    /// Broadcast "who has `target_ip`"
    pub fn arp_request(&mut self, target_ip: Ipv4Addr) -> Result<()> {
        let request = ArpPacket::request(self.config.mac, self.config.ip, target_ip);
        log::debug!("arp: who has {}? tell {}", target_ip, self.config.ip);
        self.ethernet_out(
            PacketBuf::from_slice(&request.to_bytes()),
            MacAddress::BROADCAST,
            ETHERTYPE_ARP,
        )
    }

    /// Handle an inbound ARP message
    ///
    /// Every accepted message teaches the table the sender's binding. If a
    /// packet is held, the slot is emptied and the packet is sent if its own
    /// destination now resolves, otherwise it is lost. Only with an empty
    /// slot is a request for our address answered.
    pub fn arp_in(&mut self, buf: PacketBuf) -> Result<()> {
        let packet = match ArpPacket::from_bytes(buf.data()) {
            Some(packet) => packet,
            None => {
                self.drop_packet("arp", DropReason::Malformed("message shorter than 28 bytes"));
                return Ok(());
            }
        };

        let operation = match packet.validate() {
            Ok(operation) => operation,
            Err(reason) => {
                self.drop_packet("arp", reason);
                return Ok(());
            }
        };

        log::trace!(
            "arp: {:?} from {} ({}) for {}",
            operation,
            packet.sender_ip,
            packet.sender_mac,
            packet.target_ip
        );
        self.arp_update(packet.sender_ip, packet.sender_mac);

        if let Some(pending) = self.pending.take() {
            return match self.arp_table.lookup(pending.ip) {
                Some(mac) => {
                    log::debug!("arp: {} resolved to {}, sending held packet", pending.ip, mac);
                    self.ethernet_out(pending.buf, mac, pending.protocol)
                }
                None => {
                    log::debug!("arp: {} still unresolved, held packet dropped", pending.ip);
                    self.stats.pending_dropped += 1;
                    Ok(())
                }
            };
        }

        if operation == ArpOperation::Request && packet.target_ip == self.config.ip {
            let reply = ArpPacket::reply(
                self.config.mac,
                self.config.ip,
                packet.sender_mac,
                packet.sender_ip,
            );
            log::debug!("arp: {} is at {}, telling {}", self.config.ip, self.config.mac, packet.sender_ip);
            return self.ethernet_out(
                PacketBuf::from_slice(&reply.to_bytes()),
                packet.sender_mac,
                ETHERTYPE_ARP,
            );
        }

        Ok(())
    }

    /// Send `buf` to `ip`, resolving its MAC first if needed
    ///
    /// On a miss the packet takes the single hold slot, replacing whatever
    /// was waiting there, and a request is broadcast.
    pub fn arp_out(&mut self, buf: PacketBuf, ip: Ipv4Addr, protocol: u16) -> Result<()> {
        if let Some(mac) = self.arp_table.lookup(ip) {
            return self.ethernet_out(buf, mac, protocol);
        }

        let held = PendingPacket { buf, ip, protocol };
        if let Some(previous) = self.pending.replace(held) {
            log::warn!(
                "arp: packet for {} replaced by one for {} while resolving",
                previous.ip,
                ip
            );
            self.stats.pending_overwritten += 1;
        }
        self.arp_request(ip)
    }
}
