//! Link layer
//!
//! This module contains the link layer wire formats and state:
//! - Ethernet II framing and MAC addresses
//! - ARP messages
//! - The ARP cache and its single-slot hold queue

pub mod arp;
pub mod arp_table;
pub mod ethernet;

// Re-export commonly used items
pub use arp::{ArpOperation, ArpPacket, ARP_PACKET_LEN};
pub use arp_table::{ArpEntry, ArpState, ArpTable, PendingPacket};
pub use ethernet::{EthernetHeader, MacAddress, ETHERNET_HEADER_LEN, ETHERTYPE_ARP, ETHERTYPE_IPV4};
