//! A minimal host-side network stack in Rust
//!
//! This library sits directly on a raw Ethernet frame driver and provides:
//! - Ethernet framing and EtherType demultiplexing
//! - ARP resolution with an aging cache and a single-slot hold queue
//! - IPv4 validation, dispatch and outbound fragmentation
//! - ICMP echo replies and destination-unreachable reports
//! - UDP port demultiplexing
//!
//! Everything runs single-threaded: the caller drives the stack by calling
//! [`Stack::poll`] in a loop.

pub mod buf;
pub mod config;
pub mod error;
pub mod iface;
pub mod link;
pub mod network;
pub mod transport;

// Re-export commonly used types
pub use buf::PacketBuf;
pub use config::StackConfig;
pub use error::{DropReason, StackError};
pub use iface::{Driver, MemoryDriver, Stack, Stats, TapDriver};
pub use link::{ArpTable, MacAddress};
pub use network::{IcmpCode, Ipv4Header};
pub use transport::UdpDatagram;
