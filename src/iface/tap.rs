//! Linux TAP device driver
//!
//! The device must exist and be configured by the caller
//! (`ip tuntap add dev tap0 mode tap`, `ip link set up dev tap0`).

use std::io;

use crate::iface::driver::Driver;
use tun_tap::{Iface, Mode};

pub struct TapDriver {
    name: String,
    iface: Option<Iface>,
}

impl TapDriver {
    pub fn new(name: &str) -> Self {
        TapDriver {
            name: name.to_string(),
            iface: None,
        }
    }

    /// Name of the device, as reported by the kernel once open
    pub fn name(&self) -> &str {
        match &self.iface {
            Some(iface) => iface.name(),
            None => &self.name,
        }
    }

    fn iface(&self) -> io::Result<&Iface> {
        self.iface
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "tap device is not open"))
    }
}

impl Driver for TapDriver {
    fn open(&mut self) -> io::Result<()> {
        let iface = Iface::without_packet_info(&self.name, Mode::Tap)?;
        iface.set_non_blocking()?;
        log::info!("opened tap device {}", iface.name());
        self.iface = Some(iface);
        Ok(())
    }

    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        let sent = self.iface()?.send(frame)?;
        if sent != frame.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short write: {} of {} bytes", sent, frame.len()),
            ));
        }
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.iface()?.recv(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(e),
        }
    }
}
