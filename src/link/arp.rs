//! ARP message wire format (RFC 826, Ethernet/IPv4 only)
//!
//! Layout, all multi-byte fields big-endian:
//! hardware type (2), protocol type (2), hardware length (1),
//! protocol length (1), opcode (2), sender MAC (6), sender IP (4),
//! target MAC (6), target IP (4).

use std::net::Ipv4Addr;

use crate::error::DropReason;
use crate::link::ethernet::{MacAddress, ETHERTYPE_IPV4};
use byteorder::{BigEndian, ByteOrder};

pub const ARP_PACKET_LEN: usize = 28;
pub const ARP_HW_ETHERNET: u16 = 1;
const ARP_HW_LEN: u8 = 6;
const ARP_PROTO_LEN: u8 = 4;

/// ARP operation codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ArpOperation {
    Request = 1,
    Reply = 2,
}

impl ArpOperation {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(ArpOperation::Request),
            2 => Some(ArpOperation::Reply),
            _ => None,
        }
    }
}

/// Raw ARP message; fields are kept as received so they can be validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpPacket {
    pub hw_type: u16,
    pub proto_type: u16,
    pub hw_len: u8,
    pub proto_len: u8,
    pub opcode: u16,
    pub sender_mac: MacAddress,
    pub sender_ip: Ipv4Addr,
    pub target_mac: MacAddress,
    pub target_ip: Ipv4Addr,
}

impl ArpPacket {
    fn new(
        operation: ArpOperation,
        sender_mac: MacAddress,
        sender_ip: Ipv4Addr,
        target_mac: MacAddress,
        target_ip: Ipv4Addr,
    ) -> Self {
        ArpPacket {
            hw_type: ARP_HW_ETHERNET,
            proto_type: ETHERTYPE_IPV4,
            hw_len: ARP_HW_LEN,
            proto_len: ARP_PROTO_LEN,
            opcode: operation as u16,
            sender_mac,
            sender_ip,
            target_mac,
            target_ip,
        }
    }

    /// "Who has `target_ip`? Tell `sender_ip`", target MAC all-zero
    pub fn request(sender_mac: MacAddress, sender_ip: Ipv4Addr, target_ip: Ipv4Addr) -> Self {
        Self::new(
            ArpOperation::Request,
            sender_mac,
            sender_ip,
            MacAddress::ZERO,
            target_ip,
        )
    }

    pub fn reply(
        sender_mac: MacAddress,
        sender_ip: Ipv4Addr,
        target_mac: MacAddress,
        target_ip: Ipv4Addr,
    ) -> Self {
        Self::new(ArpOperation::Reply, sender_mac, sender_ip, target_mac, target_ip)
    }

    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < ARP_PACKET_LEN {
            return None;
        }

        Some(ArpPacket {
            hw_type: BigEndian::read_u16(&data[0..2]),
            proto_type: BigEndian::read_u16(&data[2..4]),
            hw_len: data[4],
            proto_len: data[5],
            opcode: BigEndian::read_u16(&data[6..8]),
            sender_mac: MacAddress::from_bytes(&data[8..14])?,
            sender_ip: Ipv4Addr::new(data[14], data[15], data[16], data[17]),
            target_mac: MacAddress::from_bytes(&data[18..24])?,
            target_ip: Ipv4Addr::new(data[24], data[25], data[26], data[27]),
        })
    }

    pub fn to_bytes(&self) -> [u8; ARP_PACKET_LEN] {
        let mut bytes = [0u8; ARP_PACKET_LEN];
        BigEndian::write_u16(&mut bytes[0..2], self.hw_type);
        BigEndian::write_u16(&mut bytes[2..4], self.proto_type);
        bytes[4] = self.hw_len;
        bytes[5] = self.proto_len;
        BigEndian::write_u16(&mut bytes[6..8], self.opcode);
        bytes[8..14].copy_from_slice(&self.sender_mac.0);
        bytes[14..18].copy_from_slice(&self.sender_ip.octets());
        bytes[18..24].copy_from_slice(&self.target_mac.0);
        bytes[24..28].copy_from_slice(&self.target_ip.octets());
        bytes
    }

    /// Check the Ethernet/IPv4 constants and return the operation
    pub fn validate(&self) -> Result<ArpOperation, DropReason> {
        if self.hw_type != ARP_HW_ETHERNET {
            return Err(DropReason::Malformed("arp hardware type is not ethernet"));
        }
        if self.proto_type != ETHERTYPE_IPV4 {
            return Err(DropReason::Malformed("arp protocol type is not ipv4"));
        }
        if self.hw_len != ARP_HW_LEN {
            return Err(DropReason::Malformed("arp hardware length is not 6"));
        }
        if self.proto_len != ARP_PROTO_LEN {
            return Err(DropReason::Malformed("arp protocol length is not 4"));
        }
        ArpOperation::from_u16(self.opcode).ok_or(DropReason::Malformed("arp opcode unknown"))
    }
}
