//! Ethernet II header wire format

use std::fmt;
use std::str::FromStr;

use crate::error::ParseMacError;
use byteorder::{BigEndian, ByteOrder};

pub const ETHERNET_HEADER_LEN: usize = 14;

/// EtherType values
pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_ARP: u16 = 0x0806;

/// 48-bit link-layer address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub const BROADCAST: MacAddress = MacAddress([0xFF; 6]);
    pub const ZERO: MacAddress = MacAddress([0; 6]);

    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        let mut mac = [0u8; 6];
        mac.copy_from_slice(data.get(..6)?);
        Some(MacAddress(mac))
    }

    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        )
    }
}

impl FromStr for MacAddress {
    type Err = ParseMacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut mac = [0u8; 6];
        let mut parts = s.split(|c| c == ':' || c == '-');
        for octet in mac.iter_mut() {
            let part = parts.next().ok_or_else(|| ParseMacError(s.to_string()))?;
            if part.len() != 2 {
                return Err(ParseMacError(s.to_string()));
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| ParseMacError(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(ParseMacError(s.to_string()));
        }
        Ok(MacAddress(mac))
    }
}

/// Ethernet II header: destination, source, EtherType
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    pub dst: MacAddress,
    pub src: MacAddress,
    pub ethertype: u16,
}

impl EthernetHeader {
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < ETHERNET_HEADER_LEN {
            return None;
        }

        Some(EthernetHeader {
            dst: MacAddress::from_bytes(&data[0..6])?,
            src: MacAddress::from_bytes(&data[6..12])?,
            ethertype: BigEndian::read_u16(&data[12..14]),
        })
    }

    /// Write the header into the first 14 bytes of `bytes`
    pub fn write(&self, bytes: &mut [u8]) {
        bytes[0..6].copy_from_slice(&self.dst.0);
        bytes[6..12].copy_from_slice(&self.src.0);
        BigEndian::write_u16(&mut bytes[12..14], self.ethertype);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_parse_and_display() {
        let mac: MacAddress = "aa:BB:cc:dd:ee:ff".parse().unwrap();
        assert_eq!(mac, MacAddress([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]));
        assert_eq!(mac.to_string(), "aa:bb:cc:dd:ee:ff");

        assert!("aa:bb:cc:dd:ee".parse::<MacAddress>().is_err());
        assert!("aa:bb:cc:dd:ee:ff:00".parse::<MacAddress>().is_err());
        assert!("aa:bb:cc:dd:ee:zz".parse::<MacAddress>().is_err());
        assert!(MacAddress::BROADCAST.is_broadcast());
    }

    #[test]
    fn test_header_layout() {
        let header = EthernetHeader {
            dst: MacAddress::BROADCAST,
            src: MacAddress([1, 2, 3, 4, 5, 6]),
            ethertype: ETHERTYPE_ARP,
        };
        let mut bytes = [0u8; ETHERNET_HEADER_LEN];
        header.write(&mut bytes);
        assert_eq!(&bytes[12..14], &[0x08, 0x06]);
        assert_eq!(EthernetHeader::from_bytes(&bytes), Some(header));
        assert!(EthernetHeader::from_bytes(&bytes[..13]).is_none());
    }
}
