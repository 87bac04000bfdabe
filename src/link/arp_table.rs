//! IP to MAC cache and the pending-packet hold slot
//!
//! The table has a fixed number of slots. Entries age out lazily: a stale
//! entry is only invalidated when [`ArpTable::update`] scans the table.

use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use crate::buf::PacketBuf;
use crate::link::ethernet::MacAddress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArpState {
    Invalid,
    Valid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpEntry {
    pub ip: Ipv4Addr,
    pub mac: MacAddress,
    pub state: ArpState,
    /// When the binding was installed
    pub timeout: Instant,
}

impl ArpEntry {
    fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.timeout)
    }
}

#[derive(Debug, Clone)]
pub struct ArpTable {
    entries: Vec<ArpEntry>,
    lifetime: Duration,
}

impl ArpTable {
    pub fn new(capacity: usize, lifetime: Duration, now: Instant) -> Self {
        let entries = vec![
            ArpEntry {
                ip: Ipv4Addr::UNSPECIFIED,
                mac: MacAddress::ZERO,
                state: ArpState::Invalid,
                timeout: now,
            };
            capacity
        ];
        ArpTable { entries, lifetime }
    }

    /// Mark every entry Invalid
    pub fn clear(&mut self) {
        for entry in self.entries.iter_mut() {
            entry.state = ArpState::Invalid;
        }
    }

    /// MAC of the first Valid entry for `ip`
    pub fn lookup(&self, ip: Ipv4Addr) -> Option<MacAddress> {
        self.entries
            .iter()
            .find(|e| e.state == ArpState::Valid && e.ip == ip)
            .map(|e| e.mac)
    }

    /// Install or refresh the binding `ip -> mac`
    ///
    /// Entries older than the lifetime are invalidated first. An existing
    /// Valid entry for `ip` is refreshed in place; otherwise the first
    /// Invalid slot is used, and with no Invalid slot the oldest Valid entry
    /// (lowest index on ties) is overwritten.
    pub fn update(&mut self, ip: Ipv4Addr, mac: MacAddress, now: Instant) {
        for entry in self.entries.iter_mut() {
            if entry.state == ArpState::Valid && entry.age(now) > self.lifetime {
                log::debug!("arp: entry {} -> {} expired", entry.ip, entry.mac);
                entry.state = ArpState::Invalid;
            }
        }

        let slot = self
            .entries
            .iter()
            .position(|e| e.state == ArpState::Valid && e.ip == ip)
            .or_else(|| {
                self.entries
                    .iter()
                    .position(|e| e.state == ArpState::Invalid)
            })
            .or_else(|| self.oldest(now));

        let Some(index) = slot else {
            // Zero-capacity table
            return;
        };

        let entry = &mut self.entries[index];
        if entry.state == ArpState::Valid && entry.ip != ip {
            log::debug!("arp: table full, evicting {} -> {}", entry.ip, entry.mac);
        }
        *entry = ArpEntry {
            ip,
            mac,
            state: ArpState::Valid,
            timeout: now,
        };
    }

    /// Index of the Valid entry with the greatest age, lowest index on ties
    fn oldest(&self, now: Instant) -> Option<usize> {
        let mut oldest: Option<(usize, Duration)> = None;
        for (index, entry) in self.entries.iter().enumerate() {
            let age = entry.age(now);
            match oldest {
                Some((_, best)) if age <= best => {}
                _ => oldest = Some((index, age)),
            }
        }
        oldest.map(|(index, _)| index)
    }

    pub fn entries(&self) -> &[ArpEntry] {
        &self.entries
    }

    pub fn valid_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.state == ArpState::Valid)
            .count()
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }
}

/// Outbound datagram waiting for its destination to resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPacket {
    pub buf: PacketBuf,
    pub ip: Ipv4Addr,
    /// EtherType to frame the packet with once resolved
    pub protocol: u16,
}
