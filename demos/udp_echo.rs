//! Ping responder and UDP echo server on a TAP device
//!
//! Run as root, then from the host: `ping 10.0.0.1` or
//! `nc -u 10.0.0.1 7`.

mod utils;

use std::thread;
use std::time::Duration;

use clap::Parser;
use eth_host_stack::{Stack, StackConfig, StackError, TapDriver};
use utils::network::{configure_interface, Args};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = StackConfig::new(args.ip, args.mac);
    let mut stack = Stack::new(config, TapDriver::new(&args.tap));
    configure_interface(&args.tap, &args.host_cidr)?;
    stack.init()?;
    stack.udp_bind(args.port)?;

    loop {
        match stack.poll() {
            Ok(true) => {}
            Ok(false) => thread::sleep(Duration::from_millis(1)),
            // A failed send loses one packet; keep serving
            Err(StackError::Driver(e)) => log::warn!("driver error: {}", e),
            Err(e) => return Err(e.into()),
        }

        while let Some(datagram) = stack.udp_recv(args.port) {
            log::info!(
                "echoing {} bytes to {}:{}",
                datagram.payload.len(),
                datagram.src_addr,
                datagram.src_port
            );
            stack.udp_send(args.port, datagram.src_addr, datagram.src_port, &datagram.payload)?;
        }
    }
}
