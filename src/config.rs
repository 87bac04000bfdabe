//! Static stack configuration

use std::net::Ipv4Addr;
use std::time::Duration;

use crate::link::MacAddress;

pub const DEFAULT_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 163, 103);
pub const DEFAULT_MAC: MacAddress = MacAddress([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
pub const DEFAULT_ARP_CAPACITY: usize = 16;
pub const DEFAULT_ARP_LIFETIME: Duration = Duration::from_secs(60);
pub const ETHERNET_MTU: usize = 1500;

/// Smallest MTU that still carries a 20-byte header and one 8-byte fragment unit
pub const MIN_MTU: usize = 28;

/// Bring `mtu` into the range the fragmenter can work with
pub(crate) fn clamp_mtu(mtu: usize) -> usize {
    mtu.clamp(MIN_MTU, ETHERNET_MTU)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackConfig {
    /// Local IPv4 address
    pub ip: Ipv4Addr,
    /// Local MAC address, used as the source of every frame
    pub mac: MacAddress,
    /// Number of ARP table slots
    pub arp_capacity: usize,
    /// Age after which an ARP entry is invalidated
    pub arp_lifetime: Duration,
    /// Largest IP datagram handed to the link layer
    pub mtu: usize,
}

impl Default for StackConfig {
    fn default() -> Self {
        StackConfig {
            ip: DEFAULT_IP,
            mac: DEFAULT_MAC,
            arp_capacity: DEFAULT_ARP_CAPACITY,
            arp_lifetime: DEFAULT_ARP_LIFETIME,
            mtu: ETHERNET_MTU,
        }
    }
}

impl StackConfig {
    pub fn new(ip: Ipv4Addr, mac: MacAddress) -> Self {
        StackConfig {
            ip,
            mac,
            ..Default::default()
        }
    }

    pub fn with_arp_capacity(mut self, capacity: usize) -> Self {
        self.arp_capacity = capacity;
        self
    }

    pub fn with_arp_lifetime(mut self, lifetime: Duration) -> Self {
        self.arp_lifetime = lifetime;
        self
    }

    pub fn with_mtu(mut self, mtu: usize) -> Self {
        self.mtu = clamp_mtu(mtu);
        self
    }
}
