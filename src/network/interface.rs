//! Core network types for interface representation.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};

use super::ConversionError;

/// Portable interface flags reported by the OS.
///
/// The cache never interprets these; they are carried through for callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)] // OS flags are naturally boolean
pub struct InterfaceFlags {
    /// Interface is administratively up.
    pub up: bool,
    /// Interface supports broadcast.
    pub broadcast: bool,
    /// Interface is a loopback interface.
    pub loopback: bool,
    /// Interface is a point-to-point link (PPP, many VPN tunnels).
    pub point_to_point: bool,
    /// Interface supports multicast.
    pub multicast: bool,
    /// Interface is operationally running.
    pub running: bool,
}

impl fmt::Display for InterfaceFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (self.up, "up"),
            (self.broadcast, "broadcast"),
            (self.loopback, "loopback"),
            (self.point_to_point, "pointtopoint"),
            (self.multicast, "multicast"),
            (self.running, "running"),
        ];

        let mut first = true;
        for (_, name) in names.iter().filter(|(set, _)| *set) {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(name)?;
            first = false;
        }
        if first {
            f.write_str("0")?;
        }
        Ok(())
    }
}

/// A link-layer (hardware) address of arbitrary length.
///
/// Displays and parses as colon-separated lowercase hex, e.g. `00:1a:2b:3c:4d:5e`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HardwareAddr(Vec<u8>);

impl HardwareAddr {
    /// Creates a hardware address from raw bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Returns the raw address bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for HardwareAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Error returned when parsing a [`HardwareAddr`] from a string fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid hardware address '{0}'")]
pub struct ParseHardwareAddrError(String);

impl FromStr for HardwareAddr {
    type Err = ParseHardwareAddrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s
            .split(':')
            .map(|part| {
                if part.len() == 2 {
                    u8::from_str_radix(part, 16).ok()
                } else {
                    None
                }
            })
            .collect::<Option<Vec<u8>>>()
            .ok_or_else(|| ParseHardwareAddrError(s.to_string()))?;

        Ok(Self(bytes))
    }
}

impl TryFrom<String> for HardwareAddr {
    type Error = ParseHardwareAddrError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HardwareAddr> for String {
    fn from(addr: HardwareAddr) -> Self {
        addr.to_string()
    }
}

/// A snapshot of a single network interface at enumeration time.
///
/// # Equality
///
/// Two interfaces are equal if every field is equal.
/// Address order matters for equality comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    /// The interface name (e.g., "eth0", "en0", "Wi-Fi").
    pub name: String,
    /// The OS-assigned interface index.
    pub index: u32,
    /// Maximum transmission unit, 0 when unknown.
    #[serde(default)]
    pub mtu: u32,
    /// Interface flags.
    #[serde(default)]
    pub flags: InterfaceFlags,
    /// Link-layer address, if the interface has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware_addr: Option<HardwareAddr>,
    /// Address prefixes bound to this interface, in OS order.
    #[serde(default)]
    pub addresses: Vec<IpNetwork>,
}

impl Interface {
    /// Creates an interface with the given name, index and addresses.
    ///
    /// Metadata (MTU, flags, hardware address) starts empty.
    #[must_use]
    pub fn new(name: impl Into<String>, index: u32, addresses: Vec<IpNetwork>) -> Self {
        Self {
            name: name.into(),
            index,
            mtu: 0,
            flags: InterfaceFlags::default(),
            hardware_addr: None,
            addresses,
        }
    }

    /// Returns true if any prefix on this interface contains `addr`.
    #[must_use]
    pub fn contains(&self, addr: IpAddr) -> bool {
        self.addresses.iter().any(|prefix| prefix.contains(addr))
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: index={} mtu={} flags={}",
            self.name, self.index, self.mtu, self.flags
        )?;
        if let Some(ref hw) = self.hardware_addr {
            write!(f, " hwaddr={hw}")?;
        }
        for prefix in &self.addresses {
            write!(f, " {prefix}")?;
        }
        Ok(())
    }
}

/// How the OS reported the mask of a raw address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawMask {
    /// A dotted/colon netmask of the same family as the address.
    Netmask(IpAddr),
    /// A prefix length in bits.
    PrefixLen(u8),
    /// No mask reported; the address is treated as a host prefix.
    Host,
}

/// One address entry as reported by the OS, before conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawAddress {
    /// The address bound to the interface.
    pub ip: IpAddr,
    /// The mask reported alongside it.
    pub mask: RawMask,
}

impl RawAddress {
    /// Converts this entry into a prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] if the netmask is non-contiguous or of a
    /// different family, or if the prefix length is too large.
    pub fn to_network(&self) -> Result<IpNetwork, ConversionError> {
        match self.mask {
            RawMask::Netmask(mask) if self.ip.is_ipv4() != mask.is_ipv4() => {
                Err(ConversionError::InvalidNetmask {
                    addr: self.ip,
                    mask,
                    reason: "netmask family differs from address family".to_string(),
                })
            }
            RawMask::Netmask(mask) => IpNetwork::with_netmask(self.ip, mask).map_err(|e| {
                ConversionError::InvalidNetmask {
                    addr: self.ip,
                    mask,
                    reason: e.to_string(),
                }
            }),
            RawMask::PrefixLen(len) => {
                IpNetwork::new(self.ip, len).map_err(|e| ConversionError::InvalidPrefixLen {
                    addr: self.ip,
                    len,
                    reason: e.to_string(),
                })
            }
            RawMask::Host => Ok(IpNetwork::from(self.ip)),
        }
    }
}

/// One interface as reported by the OS enumeration primitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInterface {
    /// Interface name.
    pub name: String,
    /// OS-assigned index.
    pub index: u32,
    /// Maximum transmission unit, 0 when unknown.
    pub mtu: u32,
    /// Interface flags.
    pub flags: InterfaceFlags,
    /// Raw link-layer address bytes.
    pub hardware_addr: Option<Vec<u8>>,
    /// Addresses in OS order.
    pub addresses: Vec<RawAddress>,
}

impl TryFrom<RawInterface> for Interface {
    type Error = ConversionError;

    fn try_from(raw: RawInterface) -> Result<Self, Self::Error> {
        let addresses = raw
            .addresses
            .iter()
            .map(RawAddress::to_network)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: raw.name,
            index: raw.index,
            mtu: raw.mtu,
            flags: raw.flags,
            hardware_addr: raw
                .hardware_addr
                .filter(|bytes| !bytes.is_empty())
                .map(HardwareAddr::new),
            addresses,
        })
    }
}
