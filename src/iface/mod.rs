//! Stack context and per-layer packet processing
//!
//! This module ties the wire formats together:
//! - The driver boundary and its TAP and in-memory implementations
//! - The `Stack` context owning all shared protocol state
//! - Inbound dispatch and outbound framing for Ethernet, ARP, IPv4, ICMP and UDP

pub mod arp;
pub mod driver;
pub mod ethernet;
pub mod icmp;
pub mod ipv4;
pub mod stack;
pub mod tap;
pub mod udp;

// Re-export commonly used items
pub use driver::{Driver, MemoryDriver};
pub use stack::{Stack, Stats};
pub use tap::TapDriver;
