//! Utility functions for the demos
//!
//! Host-side configuration of the TAP device and the shared command line.

pub mod network;

pub use network::*;
