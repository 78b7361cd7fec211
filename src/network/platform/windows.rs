//! Windows interface enumeration using `GetAdaptersAddresses`.

use crate::network::{
    FetchError, InterfaceFlags, InterfaceSource, RawAddress, RawInterface, RawMask,
};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use windows::Win32::Foundation::{ERROR_BUFFER_OVERFLOW, NO_ERROR, WIN32_ERROR};
use windows::Win32::NetworkManagement::IpHelper::{
    GAA_FLAG_SKIP_ANYCAST, GAA_FLAG_SKIP_DNS_SERVER, GAA_FLAG_SKIP_MULTICAST,
    GET_ADAPTERS_ADDRESSES_FLAGS, GetAdaptersAddresses, IF_TYPE_ETHERNET_CSMACD,
    IF_TYPE_IEEE80211, IF_TYPE_SOFTWARE_LOOPBACK, IP_ADAPTER_ADDRESSES_LH,
    IP_ADAPTER_NO_MULTICAST,
};
use windows::Win32::NetworkManagement::Ndis::IfOperStatusUp;
use windows::Win32::Networking::WinSock::{
    AF_INET, AF_INET6, AF_UNSPEC, SOCKADDR_IN, SOCKADDR_IN6,
};

/// Interface type for PPP (Point-to-Point Protocol) adapters.
/// Value from Windows SDK `iptypes.h` - not exported by the `windows` crate.
const IF_TYPE_PPP: u32 = 23;

/// Interface type for tunnel adapters (VPN, etc.).
/// Value from Windows SDK `iptypes.h` - not exported by the `windows` crate.
const IF_TYPE_TUNNEL: u32 = 131;

/// Buffer size hint for `GetAdaptersAddresses`.
/// The API will tell us the actual required size if this is insufficient.
const INITIAL_BUFFER_SIZE: u32 = 16384;

/// Windows implementation of [`InterfaceSource`] using `GetAdaptersAddresses`.
///
/// Interfaces are named by their friendly name ("Ethernet", "Wi-Fi"). Windows
/// has no direct lookup by friendly name, so the existence probes
/// re-enumerate and search.
///
/// # Example
///
/// ```no_run
/// use ifcache::network::{InterfaceSource, platform::WindowsSource};
///
/// let source = WindowsSource::new();
/// for iface in source.enumerate().expect("Failed to enumerate interfaces") {
///     println!("{} ({}): {:?}", iface.name, iface.index, iface.addresses);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct WindowsSource {
    _private: (),
}

impl WindowsSource {
    /// Creates a new Windows interface source.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    fn probe(predicate: impl Fn(&RawInterface) -> bool) -> bool {
        match enumerate_adapters() {
            Ok(interfaces) => interfaces.iter().any(predicate),
            Err(e) => {
                tracing::trace!("Existence probe failed: {e}");
                false
            }
        }
    }
}

impl InterfaceSource for WindowsSource {
    fn enumerate(&self) -> Result<Vec<RawInterface>, FetchError> {
        enumerate_adapters()
    }

    fn exists_by_name(&self, name: &str) -> bool {
        Self::probe(|iface| iface.name == name)
    }

    fn exists_by_index(&self, index: u32) -> bool {
        Self::probe(|iface| iface.index == index)
    }
}

/// Enumerates all adapters using `GetAdaptersAddresses`.
fn enumerate_adapters() -> Result<Vec<RawInterface>, FetchError> {
    let buffer = get_adapter_addresses()?;

    let mut interfaces = Vec::new();
    // SAFETY: GetAdaptersAddresses returns a properly aligned buffer for IP_ADAPTER_ADDRESSES_LH.
    #[allow(clippy::cast_ptr_alignment)]
    let mut current = buffer.as_ptr().cast::<IP_ADAPTER_ADDRESSES_LH>();

    // SAFETY: The linked list stays valid as long as `buffer` is alive.
    while !current.is_null() {
        let adapter = unsafe { &*current };
        interfaces.push(parse_adapter(adapter)?);
        current = adapter.Next;
    }

    Ok(interfaces)
}

/// Calls `GetAdaptersAddresses` and returns the raw buffer containing adapter data.
///
/// The first call uses an estimated size; on `ERROR_BUFFER_OVERFLOW` the
/// buffer is grown to the size the API reported and the call is repeated.
fn get_adapter_addresses() -> Result<Vec<u8>, FetchError> {
    let flags = GAA_FLAG_SKIP_ANYCAST | GAA_FLAG_SKIP_MULTICAST | GAA_FLAG_SKIP_DNS_SERVER;
    let family = u32::from(AF_UNSPEC.0);

    let mut buffer: Vec<u8> = vec![0u8; INITIAL_BUFFER_SIZE as usize];
    let mut size = INITIAL_BUFFER_SIZE;

    let mut result = call_api(&mut buffer, &mut size, flags, family);
    if result == ERROR_BUFFER_OVERFLOW.0 {
        buffer.resize(size as usize, 0);
        result = call_api(&mut buffer, &mut size, flags, family);
    }

    if result != NO_ERROR.0 {
        return Err(windows::core::Error::from(WIN32_ERROR(result)).into());
    }

    Ok(buffer)
}

#[cfg(not(tarpaulin_include))]
fn call_api(
    buffer: &mut [u8],
    size: &mut u32,
    flags: GET_ADAPTERS_ADDRESSES_FLAGS,
    family: u32,
) -> u32 {
    // SAFETY: `buffer` is at least `size` bytes. The function writes adapter
    // information to it and updates `size` with the required length.
    unsafe {
        GetAdaptersAddresses(
            family,
            flags,
            None,
            Some(buffer.as_mut_ptr().cast()),
            &raw mut *size,
        )
    }
}

/// Parses a single `IP_ADAPTER_ADDRESSES_LH` structure into a [`RawInterface`].
fn parse_adapter(adapter: &IP_ADAPTER_ADDRESSES_LH) -> Result<RawInterface, FetchError> {
    let name = unsafe { adapter.FriendlyName.to_string() }.map_err(|e| FetchError::Platform {
        message: format!("unreadable adapter name: {e}"),
    })?;

    // SAFETY: The IfIndex arm of the union is always populated by the API.
    let if_index = unsafe { adapter.Anonymous1.Anonymous.IfIndex };
    let index = if if_index == 0 {
        adapter.Ipv6IfIndex
    } else {
        if_index
    };

    // SAFETY: The Flags arm of the union is always populated by the API.
    let adapter_flags = unsafe { adapter.Anonymous2.Flags };

    let hw_len = (adapter.PhysicalAddressLength as usize).min(adapter.PhysicalAddress.len());
    let hardware_addr = Some(adapter.PhysicalAddress[..hw_len].to_vec());

    Ok(RawInterface {
        name,
        index,
        mtu: adapter.Mtu,
        flags: map_flags(
            adapter.IfType,
            adapter.OperStatus == IfOperStatusUp,
            adapter_flags & IP_ADAPTER_NO_MULTICAST == 0,
        ),
        hardware_addr,
        addresses: collect_addresses(adapter),
    })
}

/// Derives portable flags from the Windows `IF_TYPE_*` and status fields.
const fn map_flags(if_type: u32, oper_up: bool, multicast: bool) -> InterfaceFlags {
    let (broadcast, loopback, point_to_point) = match if_type {
        IF_TYPE_ETHERNET_CSMACD | IF_TYPE_IEEE80211 => (true, false, false),
        IF_TYPE_SOFTWARE_LOOPBACK => (false, true, false),
        IF_TYPE_TUNNEL | IF_TYPE_PPP => (false, false, true),
        _ => (false, false, false),
    };

    InterfaceFlags {
        up: oper_up,
        broadcast,
        loopback,
        point_to_point,
        multicast,
        running: oper_up,
    }
}

/// Collects unicast addresses with their on-link prefix lengths.
///
/// # Safety Note
///
/// The pointer casts to `SOCKADDR_IN` and `SOCKADDR_IN6` are allowed despite alignment
/// concerns because Windows guarantees proper alignment of these structures when returned
/// from the networking APIs.
#[allow(clippy::cast_ptr_alignment)]
fn collect_addresses(adapter: &IP_ADAPTER_ADDRESSES_LH) -> Vec<RawAddress> {
    let mut addresses = Vec::new();
    let mut unicast = adapter.FirstUnicastAddress;

    // SAFETY: Each entry is valid as long as the parent adapter buffer is alive.
    while !unicast.is_null() {
        let entry = unsafe { &*unicast };

        // SAFETY: lpSockaddr points to either SOCKADDR_IN or SOCKADDR_IN6.
        if let Some(sockaddr) = unsafe { entry.Address.lpSockaddr.as_ref() } {
            let ip = match sockaddr.sa_family {
                f if f == AF_INET => {
                    // SAFETY: Family is AF_INET.
                    let sockaddr_in =
                        unsafe { &*(std::ptr::from_ref(sockaddr).cast::<SOCKADDR_IN>()) };
                    let octets = unsafe { sockaddr_in.sin_addr.S_un.S_un_b };
                    Some(IpAddr::V4(Ipv4Addr::new(
                        octets.s_b1,
                        octets.s_b2,
                        octets.s_b3,
                        octets.s_b4,
                    )))
                }
                f if f == AF_INET6 => {
                    // SAFETY: Family is AF_INET6.
                    let sockaddr_in6 =
                        unsafe { &*(std::ptr::from_ref(sockaddr).cast::<SOCKADDR_IN6>()) };
                    let octets = unsafe { sockaddr_in6.sin6_addr.u.Byte };
                    Some(IpAddr::V6(Ipv6Addr::from(octets)))
                }
                _ => None,
            };

            if let Some(ip) = ip {
                addresses.push(RawAddress {
                    ip,
                    mask: RawMask::PrefixLen(entry.OnLinkPrefixLength),
                });
            }
        }

        unicast = entry.Next;
    }

    addresses
}
