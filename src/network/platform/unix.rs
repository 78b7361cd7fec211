//! Unix interface enumeration using `getifaddrs`.

use std::net::{IpAddr, SocketAddrV4, SocketAddrV6};

use nix::errno::Errno;
use nix::ifaddrs::{InterfaceAddress, getifaddrs};
use nix::net::if_::{InterfaceFlags as OsFlags, if_nameindex, if_nametoindex};
use nix::sys::socket::SockaddrStorage;

use crate::network::{
    FetchError, InterfaceFlags, InterfaceSource, RawAddress, RawInterface, RawMask,
};

/// Unix implementation of [`InterfaceSource`] built on `getifaddrs`.
///
/// `getifaddrs` reports one entry per (interface, address) pair; entries are
/// grouped by interface index in the order the OS returns them. Linux address
/// labels such as `eth0:1` are reported under their device.
///
/// # Example
///
/// ```no_run
/// use ifcache::network::{InterfaceSource, platform::UnixSource};
///
/// let source = UnixSource::new();
/// for iface in source.enumerate().expect("getifaddrs failed") {
///     println!("{} ({}): {} address(es)", iface.name, iface.index, iface.addresses.len());
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct UnixSource {
    _private: (),
}

impl UnixSource {
    /// Creates a new Unix interface source.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl InterfaceSource for UnixSource {
    fn enumerate(&self) -> Result<Vec<RawInterface>, FetchError> {
        enumerate_interfaces()
    }

    fn exists_by_name(&self, name: &str) -> bool {
        match if_nametoindex(name) {
            Ok(_) => true,
            Err(e) => {
                tracing::trace!("if_nametoindex({name}) failed: {e}");
                false
            }
        }
    }

    fn exists_by_index(&self, index: u32) -> bool {
        match if_nameindex() {
            Ok(interfaces) => interfaces.iter().any(|iface| iface.index() == index),
            Err(e) => {
                tracing::trace!("if_nameindex failed: {e}");
                false
            }
        }
    }
}

fn enumerate_interfaces() -> Result<Vec<RawInterface>, FetchError> {
    let entries = getifaddrs()?.map(|entry| Entry::from_os(&entry));
    group_entries(entries, lookup_index, read_mtu)
}

/// One `getifaddrs` record reduced to the fields the grouping needs.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    name: String,
    flags: InterfaceFlags,
    payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Payload {
    Ip(RawAddress),
    Link(Vec<u8>),
    Empty,
}

impl Entry {
    fn from_os(entry: &InterfaceAddress) -> Self {
        let payload = match entry.address.as_ref() {
            None => Payload::Empty,
            Some(address) => sockaddr_ip(address).map_or_else(
                || link_addr(address).map_or(Payload::Empty, Payload::Link),
                |ip| {
                    let mask = entry
                        .netmask
                        .as_ref()
                        .and_then(sockaddr_ip)
                        .map_or(RawMask::Host, RawMask::Netmask);
                    Payload::Ip(RawAddress { ip, mask })
                },
            ),
        };

        Self {
            name: entry.interface_name.clone(),
            flags: map_flags(entry.flags),
            payload,
        }
    }
}

/// Strips a Linux address label (`eth0:1`) down to the device name.
fn device_name(name: &str) -> &str {
    name.split_once(':').map_or(name, |(device, _)| device)
}

/// Merges entries into one record per interface index, in first-seen order.
///
/// Labeled entries fold into their device. The first link-layer address of
/// an interface wins. `resolve` returning `None` drops the entry.
fn group_entries(
    entries: impl IntoIterator<Item = Entry>,
    mut resolve: impl FnMut(&str) -> Result<Option<u32>, FetchError>,
    mtu: impl Fn(&str) -> u32,
) -> Result<Vec<RawInterface>, FetchError> {
    let mut interfaces: Vec<RawInterface> = Vec::new();

    for entry in entries {
        let name = device_name(&entry.name);

        let position = match interfaces.iter().position(|iface| iface.name == name) {
            Some(position) => position,
            None => {
                let Some(index) = resolve(name)? else {
                    continue;
                };
                if let Some(position) = interfaces.iter().position(|iface| iface.index == index) {
                    position
                } else {
                    interfaces.push(RawInterface {
                        name: name.to_string(),
                        index,
                        mtu: mtu(name),
                        flags: entry.flags,
                        hardware_addr: None,
                        addresses: Vec::new(),
                    });
                    interfaces.len() - 1
                }
            }
        };

        let iface = &mut interfaces[position];
        match entry.payload {
            Payload::Ip(address) => iface.addresses.push(address),
            Payload::Link(bytes) if iface.hardware_addr.is_none() => {
                iface.hardware_addr = Some(bytes);
            }
            Payload::Link(_) | Payload::Empty => {}
        }
    }

    Ok(interfaces)
}

/// Resolves an interface index, returning `None` if the interface vanished
/// between `getifaddrs` and the lookup.
fn lookup_index(name: &str) -> Result<Option<u32>, FetchError> {
    match if_nametoindex(name) {
        Ok(index) => Ok(Some(index)),
        Err(Errno::ENODEV | Errno::ENXIO) => {
            tracing::trace!("Interface {name} disappeared during enumeration, skipping");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn sockaddr_ip(addr: &SockaddrStorage) -> Option<IpAddr> {
    if let Some(sin) = addr.as_sockaddr_in() {
        return Some(IpAddr::V4(*SocketAddrV4::from(*sin).ip()));
    }
    if let Some(sin6) = addr.as_sockaddr_in6() {
        return Some(IpAddr::V6(*SocketAddrV6::from(*sin6).ip()));
    }
    None
}

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
))]
fn link_addr(addr: &SockaddrStorage) -> Option<Vec<u8>> {
    let link = addr.as_link_addr()?;
    link.addr()
        .filter(|bytes| bytes.iter().any(|b| *b != 0))
        .map(|bytes| bytes.to_vec())
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
)))]
const fn link_addr(_addr: &SockaddrStorage) -> Option<Vec<u8>> {
    None
}

/// Reads the MTU from sysfs; 0 when unavailable.
#[cfg(any(target_os = "linux", target_os = "android"))]
fn read_mtu(name: &str) -> u32 {
    std::fs::read_to_string(format!("/sys/class/net/{name}/mtu"))
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
const fn read_mtu(_name: &str) -> u32 {
    0
}

fn map_flags(flags: OsFlags) -> InterfaceFlags {
    InterfaceFlags {
        up: flags.contains(OsFlags::IFF_UP),
        broadcast: flags.contains(OsFlags::IFF_BROADCAST),
        loopback: flags.contains(OsFlags::IFF_LOOPBACK),
        point_to_point: flags.contains(OsFlags::IFF_POINTOPOINT),
        multicast: flags.contains(OsFlags::IFF_MULTICAST),
        running: flags.contains(OsFlags::IFF_RUNNING),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn map_flags_translates_each_bit() {
        let flags = map_flags(OsFlags::IFF_UP | OsFlags::IFF_LOOPBACK | OsFlags::IFF_RUNNING);

        assert!(flags.up);
        assert!(flags.loopback);
        assert!(flags.running);
        assert!(!flags.broadcast);
        assert!(!flags.point_to_point);
        assert!(!flags.multicast);
    }

    #[test]
    fn map_flags_point_to_point() {
        let flags = map_flags(OsFlags::IFF_POINTOPOINT | OsFlags::IFF_MULTICAST);

        assert!(flags.point_to_point);
        assert!(flags.multicast);
        assert!(!flags.up);
    }

    fn entry(name: &str, payload: Payload) -> Entry {
        Entry {
            name: name.to_string(),
            flags: InterfaceFlags {
                up: true,
                ..InterfaceFlags::default()
            },
            payload,
        }
    }

    fn ip(addr: &str, prefix: u8) -> Payload {
        Payload::Ip(RawAddress {
            ip: addr.parse().unwrap(),
            mask: RawMask::PrefixLen(prefix),
        })
    }

    fn resolve(name: &str) -> Result<Option<u32>, FetchError> {
        Ok(match name {
            "lo" => Some(1),
            "eth0" => Some(2),
            "wlan0" => Some(3),
            _ => None,
        })
    }

    fn group(entries: Vec<Entry>) -> Vec<RawInterface> {
        group_entries(entries, resolve, |_| 1500).unwrap()
    }

    mod grouping {
        use super::*;

        #[test]
        fn entries_merge_per_interface_in_os_order() {
            let interfaces = group(vec![
                entry("eth0", ip("10.0.0.5", 24)),
                entry("lo", ip("127.0.0.1", 8)),
                entry("eth0", ip("fe80::1", 64)),
            ]);

            let names: Vec<_> = interfaces.iter().map(|i| i.name.as_str()).collect();
            assert_eq!(names, vec!["eth0", "lo"]);
            assert_eq!(interfaces[0].index, 2);
            assert_eq!(interfaces[0].mtu, 1500);
            assert_eq!(interfaces[0].addresses.len(), 2);
            assert_eq!(interfaces[0].addresses[1].ip, "fe80::1".parse::<IpAddr>().unwrap());
        }

        #[test]
        fn labeled_address_folds_into_its_device() {
            let interfaces = group(vec![
                entry("lo", ip("127.0.0.1", 8)),
                entry("lo:1", ip("10.99.0.1", 24)),
                entry("lo", ip("::1", 128)),
            ]);

            assert_eq!(interfaces.len(), 1);
            assert_eq!(interfaces[0].name, "lo");
            assert_eq!(interfaces[0].index, 1);
            let addrs: Vec<_> = interfaces[0].addresses.iter().map(|a| a.ip).collect();
            assert_eq!(
                addrs,
                vec![
                    "127.0.0.1".parse::<IpAddr>().unwrap(),
                    "10.99.0.1".parse().unwrap(),
                    "::1".parse().unwrap(),
                ]
            );
        }

        #[test]
        fn label_seen_before_device_uses_device_name() {
            let interfaces = group(vec![
                entry("eth0:web", ip("10.0.0.80", 24)),
                entry("eth0", ip("10.0.0.5", 24)),
            ]);

            assert_eq!(interfaces.len(), 1);
            assert_eq!(interfaces[0].name, "eth0");
            assert_eq!(interfaces[0].addresses.len(), 2);
        }

        #[test]
        fn names_sharing_an_index_merge() {
            let interfaces = group_entries(
                vec![entry("eth0", ip("10.0.0.5", 24)), entry("wlan0", ip("10.0.1.5", 24))],
                |_| Ok(Some(7)),
                |_| 0,
            )
            .unwrap();

            assert_eq!(interfaces.len(), 1);
            assert_eq!(interfaces[0].name, "eth0");
            assert_eq!(interfaces[0].addresses.len(), 2);
        }

        #[test]
        fn first_link_address_wins() {
            let interfaces = group(vec![
                entry("eth0", Payload::Link(vec![0, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e])),
                entry("eth0", Payload::Link(vec![0xff; 6])),
            ]);

            assert_eq!(
                interfaces[0].hardware_addr.as_deref(),
                Some(&[0, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e][..])
            );
            assert!(interfaces[0].addresses.is_empty());
        }

        #[test]
        fn address_less_interface_is_kept() {
            let interfaces = group(vec![entry("wlan0", Payload::Empty)]);

            assert_eq!(interfaces.len(), 1);
            assert_eq!(interfaces[0].index, 3);
            assert!(interfaces[0].addresses.is_empty());
            assert!(interfaces[0].hardware_addr.is_none());
        }

        #[test]
        fn vanished_interface_is_skipped() {
            let interfaces = group(vec![
                entry("tun9", ip("10.8.0.2", 32)),
                entry("lo", ip("127.0.0.1", 8)),
            ]);

            assert_eq!(interfaces.len(), 1);
            assert_eq!(interfaces[0].name, "lo");
        }

        #[test]
        fn resolve_error_fails_enumeration() {
            let result = group_entries(
                vec![entry("eth0", Payload::Empty)],
                |_| Err(FetchError::Os(Errno::EACCES)),
                |_| 0,
            );

            assert!(matches!(result, Err(FetchError::Os(Errno::EACCES))));
        }

        #[test]
        fn device_name_strips_label() {
            assert_eq!(device_name("eth0:1"), "eth0");
            assert_eq!(device_name("eth0"), "eth0");
        }
    }

    #[test]
    fn unix_source_new_creates_instance() {
        let _source = UnixSource::new();
        let _default = UnixSource::default();
    }

    // Integration tests: actually query the system.

    #[test]
    fn enumerate_returns_loopback() {
        let source = UnixSource::new();
        let interfaces = source.enumerate().expect("enumerate() failed");

        let has_loopback = interfaces.iter().any(|iface| {
            iface
                .addresses
                .iter()
                .any(|a| a.ip == IpAddr::V4(Ipv4Addr::LOCALHOST))
        });
        assert!(
            has_loopback,
            "Expected a loopback address, got interfaces: {interfaces:?}"
        );
    }

    #[test]
    fn enumerated_interfaces_have_unique_names_and_indices() {
        let interfaces = UnixSource::new().enumerate().expect("enumerate() failed");

        for (i, a) in interfaces.iter().enumerate() {
            assert!(!a.name.is_empty());
            assert!(!a.name.contains(':'), "label leaked as interface: {a:?}");
            assert_ne!(a.index, 0, "index must be assigned: {a:?}");
            assert!(interfaces[i + 1..].iter().all(|b| b.name != a.name));
            assert!(interfaces[i + 1..].iter().all(|b| b.index != a.index));
        }
    }

    #[test]
    fn probes_find_loopback() {
        let source = UnixSource::new();
        let interfaces = source.enumerate().expect("enumerate() failed");
        let loopback = interfaces
            .iter()
            .find(|iface| iface.flags.loopback)
            .expect("no loopback interface");

        assert!(source.exists_by_name(&loopback.name));
        assert!(source.exists_by_index(loopback.index));
    }

    #[test]
    fn probes_report_absent_interfaces() {
        let source = UnixSource::new();

        assert!(!source.exists_by_name("ifcache-ghost0"));
        assert!(!source.exists_by_name("bad\0name"));
        assert!(!source.exists_by_index(u32::MAX));
    }
}
