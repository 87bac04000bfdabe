use std::io;
use std::net::Ipv4Addr;
use std::process::Command;

use clap::Parser;
use eth_host_stack::MacAddress;

/// Options shared by the TAP demos
#[derive(Debug, Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// TAP device to open
    #[clap(long, env = "STACK_TAP", default_value = "tap0")]
    pub tap: String,

    /// Address the stack answers on
    #[clap(long, env = "STACK_IP", default_value = "10.0.0.1")]
    pub ip: Ipv4Addr,

    /// Link address of the stack
    #[clap(long, env = "STACK_MAC", default_value = "02:00:00:00:00:01")]
    pub mac: MacAddress,

    /// Address assigned to the host end of the TAP device
    #[clap(long, env = "STACK_HOST_CIDR", default_value = "10.0.0.254/24")]
    pub host_cidr: String,

    /// UDP port to use
    #[clap(long, default_value_t = 7)]
    pub port: u16,

    /// Peer to resolve (arp_probe only)
    #[clap(long, default_value = "10.0.0.254")]
    pub target: Ipv4Addr,
}

fn run(args: &[&str]) -> io::Result<()> {
    let status = Command::new("ip").args(args).status()?;
    if !status.success() {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("`ip {}` failed with {}", args.join(" "), status),
        ));
    }
    Ok(())
}

/// Create the TAP device, assign the host address and bring it up
///
/// The device is created persistent so it is already up when the stack
/// opens it and sends its first ARP request.
pub fn configure_interface(iface_name: &str, ip_cidr: &str) -> io::Result<()> {
    if let Err(e) = run(&["tuntap", "add", "dev", iface_name, "mode", "tap"]) {
        log::warn!("could not create {} (already present?): {}", iface_name, e);
    }
    run(&["addr", "replace", ip_cidr, "dev", iface_name])?;
    run(&["link", "set", "up", "dev", iface_name])?;

    log::info!("interface {} configured with {} and brought up", iface_name, ip_cidr);
    Ok(())
}
