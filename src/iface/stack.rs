//! The stack context
//!
//! `Stack` owns everything the protocol layers share: the ARP table, the
//! pending-packet slot, the IP identification counter and the UDP sockets.
//! All processing runs on the caller's thread through [`Stack::poll`]; each
//! inbound frame is handled to completion before the next is read.
//!
//! The per-layer operations are implemented in the sibling modules
//! (`ethernet`, `arp`, `ipv4`, `icmp`, `udp`).

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::time::Instant;

use crate::buf::PacketBuf;
use crate::config::{clamp_mtu, StackConfig};
use crate::error::{DropReason, Result};
use crate::iface::driver::Driver;
use crate::link::{ArpTable, MacAddress, PendingPacket, ETHERNET_HEADER_LEN};
use crate::transport::UdpSocket;

/// Packet counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub rx_frames: u64,
    pub tx_frames: u64,
    pub malformed: u64,
    pub checksum_errors: u64,
    pub address_mismatches: u64,
    pub unknown_ethertypes: u64,
    pub unsupported: u64,
    /// Held packets discarded because their destination was still unresolved
    pub pending_dropped: u64,
    /// Held packets replaced by a newer unresolved packet
    pub pending_overwritten: u64,
}

pub struct Stack<D: Driver> {
    pub(crate) config: StackConfig,
    pub(crate) driver: D,
    rx_buf: Vec<u8>,
    pub(crate) arp_table: ArpTable,
    pub(crate) pending: Option<PendingPacket>,
    pub(crate) ip_id: u16,
    pub(crate) udp_sockets: HashMap<u16, UdpSocket>,
    pub(crate) stats: Stats,
}

impl<D: Driver> Stack<D> {
    /// Create a stack; nothing touches the driver until [`Stack::init`]
    ///
    /// An MTU outside `MIN_MTU..=ETHERNET_MTU` is clamped into that range.
    pub fn new(mut config: StackConfig, driver: D) -> Self {
        let mtu = clamp_mtu(config.mtu);
        if mtu != config.mtu {
            log::warn!("mtu {} out of range, using {}", config.mtu, mtu);
            config.mtu = mtu;
        }
        let arp_table = ArpTable::new(config.arp_capacity, config.arp_lifetime, Instant::now());
        Stack {
            config,
            driver,
            rx_buf: Vec::new(),
            arp_table,
            pending: None,
            ip_id: 0,
            udp_sockets: HashMap::new(),
            stats: Stats::default(),
        }
    }

    /// Open the driver and announce ourselves with an ARP request for our own address
    pub fn init(&mut self) -> Result<()> {
        self.rx_buf = vec![0u8; self.config.mtu + ETHERNET_HEADER_LEN];
        self.driver.open()?;
        log::info!(
            "stack up: ip {} mac {} mtu {}",
            self.config.ip,
            self.config.mac,
            self.config.mtu
        );
        self.arp_init()
    }

    /// One non-blocking receive attempt
    ///
    /// Returns whether a frame was processed. Driver errors, including send
    /// failures while answering the frame, are returned to the caller.
    pub fn poll(&mut self) -> Result<bool> {
        let n = self.driver.recv(&mut self.rx_buf)?;
        if n == 0 {
            return Ok(false);
        }

        self.stats.rx_frames += 1;
        let frame = PacketBuf::from_slice(&self.rx_buf[..n]);
        self.ethernet_in(frame)?;
        Ok(true)
    }

    /// Log and count a silently dropped packet
    pub(crate) fn drop_packet(&mut self, layer: &str, reason: DropReason) {
        log::debug!("{}: dropped packet: {}", layer, reason);
        match reason {
            DropReason::Malformed(_) => self.stats.malformed += 1,
            DropReason::ChecksumMismatch => self.stats.checksum_errors += 1,
            DropReason::AddressMismatch => self.stats.address_mismatches += 1,
            DropReason::UnknownEtherType(_) => self.stats.unknown_ethertypes += 1,
            DropReason::Unsupported(_) => self.stats.unsupported += 1,
        }
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.config.ip
    }

    pub fn mac(&self) -> MacAddress {
        self.config.mac
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn arp_table(&self) -> &ArpTable {
        &self.arp_table
    }

    /// The packet currently held for address resolution, if any
    pub fn pending(&self) -> Option<&PendingPacket> {
        self.pending.as_ref()
    }

    /// Identifier the next outbound datagram will carry
    pub fn next_ip_id(&self) -> u16 {
        self.ip_id
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
