//! Cached interface lookups with refresh-on-miss.
//!
//! [`InterfaceCache`] keeps the result of the last enumeration as an
//! immutable snapshot and answers lookups from it. A name or index miss is
//! checked against the OS; if the interface really exists the cache is
//! refreshed and the lookup retried once.
//!
//! # Locking
//!
//! The lock guards only the `Arc` holding the snapshot. Enumeration and
//! existence probes run outside it, so a slow OS call never blocks readers.
//! Concurrent refreshes are not serialized: each installs its own complete
//! result and the last one to finish wins.

use std::fmt;
use std::net::IpAddr;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

use super::{FetchError, Interface, InterfaceSource};

/// The key a failed lookup was searching for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Lookup by interface name.
    Name(String),
    /// Lookup by interface index.
    Index(u32),
    /// Lookup by contained address.
    Addr(IpAddr),
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "name '{name}'"),
            Self::Index(index) => write!(f, "index {index}"),
            Self::Addr(addr) => write!(f, "address {addr}"),
        }
    }
}

/// Error type for cache operations.
///
/// The two variants let callers tell "the interface does not exist" apart
/// from "the OS could not be asked".
#[derive(Debug, Error)]
pub enum FinderError {
    /// Enumerating or converting interfaces failed; the snapshot is unchanged.
    #[error("interface enumeration failed: {0}")]
    Enumeration(#[from] FetchError),

    /// No interface matched the lookup.
    #[error("no such network interface: {lookup}")]
    InterfaceNotFound {
        /// What was being looked up.
        lookup: Lookup,
    },
}

impl FinderError {
    /// Returns true if this error means the interface was not found.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::InterfaceNotFound { .. })
    }

    const fn not_found(lookup: Lookup) -> Self {
        Self::InterfaceNotFound { lookup }
    }
}

/// Lookup surface shared by interface caches.
///
/// Consumers that only need lookups can hold a `&dyn InterfaceFinder`.
pub trait InterfaceFinder: Send + Sync {
    /// Re-enumerates all interfaces and replaces the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Enumeration`] if enumeration or conversion fails.
    fn update(&self) -> Result<(), FinderError>;

    /// Replaces the snapshot with `interfaces`, bypassing the OS.
    fn update_interfaces(&self, interfaces: Vec<Interface>);

    /// Returns a copy of the current snapshot.
    fn interfaces(&self) -> Vec<Interface>;

    /// Finds an interface by name.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::InterfaceNotFound`] if no interface has this
    /// name, or [`FinderError::Enumeration`] if a refresh was needed and failed.
    fn by_name(&self, name: &str) -> Result<Interface, FinderError>;

    /// Finds an interface by index.
    ///
    /// # Errors
    ///
    /// Same as [`InterfaceFinder::by_name`].
    fn by_index(&self, index: u32) -> Result<Interface, FinderError>;

    /// Finds the interface owning a prefix that contains `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::InterfaceNotFound`] if no cached prefix contains `addr`.
    fn by_addr(&self, addr: IpAddr) -> Result<Interface, FinderError>;
}

/// A thread-safe cached view of the host's network interfaces.
///
/// The cache starts empty. Populate it with [`InterfaceCache::update`] or seed
/// it with [`InterfaceCache::update_interfaces`].
///
/// # Example
///
/// ```ignore
/// use ifcache::network::InterfaceCache;
///
/// let cache = InterfaceCache::platform();
/// cache.update()?;
/// let lo = cache.by_name("lo")?;
/// println!("{lo}");
/// ```
pub struct InterfaceCache<S> {
    source: S,
    snapshot: Mutex<Arc<[Interface]>>,
}

impl<S: fmt::Debug> fmt::Debug for InterfaceCache<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceCache")
            .field("source", &self.source)
            .field(
                "interfaces",
                &self
                    .snapshot
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .len(),
            )
            .finish()
    }
}

#[cfg(any(unix, windows))]
impl InterfaceCache<super::platform::PlatformSource> {
    /// Creates an empty cache backed by the native OS source.
    #[must_use]
    pub fn platform() -> Self {
        Self::new(super::platform::PlatformSource::new())
    }
}

impl<S: InterfaceSource> InterfaceCache<S> {
    /// Creates an empty cache backed by `source`.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            snapshot: Mutex::new(Arc::from(Vec::new())),
        }
    }

    /// Returns the underlying interface source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Returns the current snapshot as a shared immutable view.
    ///
    /// Cheaper than [`InterfaceCache::interfaces`] when the caller does not
    /// need an owned copy.
    #[must_use]
    pub fn snapshot(&self) -> Arc<[Interface]> {
        Arc::clone(&self.snapshot.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Re-enumerates all interfaces and atomically replaces the snapshot.
    ///
    /// The OS call runs without holding the lock. If enumeration fails, or any
    /// single record fails conversion, the existing snapshot is left as is.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Enumeration`] on enumeration or conversion failure.
    pub fn update(&self) -> Result<(), FinderError> {
        let raw = self.source.enumerate()?;

        let interfaces = raw
            .into_iter()
            .map(|record| {
                let name = record.name.clone();
                Interface::try_from(record).map_err(|source| FetchError::Conversion {
                    interface: name,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Interface cache refreshed: {} interface(s)", interfaces.len());
        self.install(interfaces);
        Ok(())
    }

    /// Replaces the snapshot with a caller-supplied list, bypassing the OS.
    ///
    /// The list is not validated.
    pub fn update_interfaces(&self, interfaces: Vec<Interface>) {
        self.install(interfaces);
    }

    /// Returns an owned copy of the current snapshot.
    #[must_use]
    pub fn interfaces(&self) -> Vec<Interface> {
        self.snapshot().to_vec()
    }

    /// Finds an interface by name, refreshing once if the OS knows it.
    ///
    /// # Errors
    ///
    /// See [`InterfaceFinder::by_name`].
    pub fn by_name(&self, name: &str) -> Result<Interface, FinderError> {
        self.find_or_refresh(
            |iface| iface.name == name,
            |source| source.exists_by_name(name),
            || Lookup::Name(name.to_string()),
        )
    }

    /// Finds an interface by index, refreshing once if the OS knows it.
    ///
    /// # Errors
    ///
    /// See [`InterfaceFinder::by_index`].
    pub fn by_index(&self, index: u32) -> Result<Interface, FinderError> {
        self.find_or_refresh(
            |iface| iface.index == index,
            |source| source.exists_by_index(index),
            || Lookup::Index(index),
        )
    }

    /// Finds the first interface with a prefix containing `addr`.
    ///
    /// Address lookups never consult the OS or refresh the cache.
    ///
    /// # Errors
    ///
    /// See [`InterfaceFinder::by_addr`].
    pub fn by_addr(&self, addr: IpAddr) -> Result<Interface, FinderError> {
        self.find(|iface| iface.contains(addr))
            .ok_or_else(|| FinderError::not_found(Lookup::Addr(addr)))
    }

    fn install(&self, interfaces: Vec<Interface>) {
        let snapshot: Arc<[Interface]> = interfaces.into();
        *self.snapshot.lock().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    fn find(&self, matches: impl Fn(&Interface) -> bool) -> Option<Interface> {
        self.snapshot().iter().find(|iface| matches(iface)).cloned()
    }

    /// Looks up in the snapshot; on a miss the OS is probed and, if the
    /// interface exists, the snapshot is refreshed and searched one more time.
    fn find_or_refresh(
        &self,
        matches: impl Fn(&Interface) -> bool,
        exists: impl FnOnce(&S) -> bool,
        lookup: impl Fn() -> Lookup,
    ) -> Result<Interface, FinderError> {
        if let Some(found) = self.find(&matches) {
            return Ok(found);
        }
        if !exists(&self.source) {
            return Err(FinderError::not_found(lookup()));
        }

        tracing::debug!("Interface {} not cached, refreshing", lookup());
        self.update()?;

        self.find(&matches).ok_or_else(|| {
            tracing::warn!("Interface {} exists but is missing after refresh", lookup());
            FinderError::not_found(lookup())
        })
    }
}

impl<S: InterfaceSource> InterfaceFinder for InterfaceCache<S> {
    fn update(&self) -> Result<(), FinderError> {
        Self::update(self)
    }

    fn update_interfaces(&self, interfaces: Vec<Interface>) {
        Self::update_interfaces(self, interfaces);
    }

    fn interfaces(&self) -> Vec<Interface> {
        Self::interfaces(self)
    }

    fn by_name(&self, name: &str) -> Result<Interface, FinderError> {
        Self::by_name(self, name)
    }

    fn by_index(&self, index: u32) -> Result<Interface, FinderError> {
        Self::by_index(self, index)
    }

    fn by_addr(&self, addr: IpAddr) -> Result<Interface, FinderError> {
        Self::by_addr(self, addr)
    }
}
