//! Resolve a peer over a TAP device and print the ARP table
//!
//! Sends one UDP datagram to `--target`, which forces an ARP request, then
//! polls until the reply arrives or a few seconds pass.

mod utils;

use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use eth_host_stack::link::ArpState;
use eth_host_stack::{Stack, StackConfig, TapDriver};
use utils::network::{configure_interface, Args};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut stack = Stack::new(StackConfig::new(args.ip, args.mac), TapDriver::new(&args.tap));
    configure_interface(&args.tap, &args.host_cidr)?;
    stack.init()?;
    stack.udp_bind(args.port)?;
    stack.udp_send(args.port, args.target, args.port, b"probe")?;

    let deadline = Instant::now() + Duration::from_secs(3);
    while stack.arp_lookup(args.target).is_none() && Instant::now() < deadline {
        if !stack.poll()? {
            thread::sleep(Duration::from_millis(5));
        }
    }

    match stack.arp_lookup(args.target) {
        Some(mac) => println!("{} is at {}", args.target, mac),
        None => println!("{} did not answer", args.target),
    }
    for entry in stack.arp_table().entries() {
        if entry.state == ArpState::Valid {
            println!("  {:<15} {}", entry.ip, entry.mac);
        }
    }
    Ok(())
}
