//! Interface source trait and error types.

use std::net::IpAddr;

use super::RawInterface;
use thiserror::Error;

/// Error converting a raw OS record into an [`Interface`](super::Interface).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The netmask is non-contiguous or belongs to a different address family.
    #[error("invalid netmask {mask} for address {addr}: {reason}")]
    InvalidNetmask {
        /// The address the mask was reported with.
        addr: IpAddr,
        /// The rejected mask.
        mask: IpAddr,
        /// Why the mask was rejected.
        reason: String,
    },

    /// The prefix length exceeds the width of the address family.
    #[error("invalid prefix length /{len} for address {addr}: {reason}")]
    InvalidPrefixLen {
        /// The address the prefix length was reported with.
        addr: IpAddr,
        /// The rejected prefix length.
        len: u8,
        /// Why the prefix length was rejected.
        reason: String,
    },
}

/// Error type for interface enumeration.
///
/// Describes what went wrong without dictating recovery strategy.
/// Callers decide how to handle each error variant.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A libc networking call failed.
    #[cfg(unix)]
    #[error("OS error: {0}")]
    Os(#[from] nix::errno::Errno),

    /// Windows API call failed.
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    WindowsApi(#[from] windows::core::Error),

    /// Platform-specific error with a generic message.
    #[error("Platform error: {message}")]
    Platform {
        /// Error message describing the platform-specific failure.
        message: String,
    },

    /// A record returned by the OS could not be converted.
    #[error("Malformed record for interface '{interface}': {source}")]
    Conversion {
        /// Name of the interface whose record was malformed.
        interface: String,
        /// Underlying conversion error.
        #[source]
        source: ConversionError,
    },
}

/// The OS collaborator behind an [`InterfaceCache`](super::InterfaceCache).
///
/// # Design
///
/// - Enumeration returns raw records; conversion happens in the cache so that
///   a malformed record fails the whole refresh
/// - Existence probes are independent of any cached state
/// - Enables dependency injection for testing with mock implementations
///
/// # Example
///
/// ```ignore
/// use ifcache::network::{FetchError, InterfaceSource, RawInterface};
///
/// struct Fixed(Vec<RawInterface>);
///
/// impl InterfaceSource for Fixed {
///     fn enumerate(&self) -> Result<Vec<RawInterface>, FetchError> {
///         Ok(self.0.clone())
///     }
///     fn exists_by_name(&self, name: &str) -> bool {
///         self.0.iter().any(|i| i.name == name)
///     }
///     fn exists_by_index(&self, index: u32) -> bool {
///         self.0.iter().any(|i| i.index == index)
///     }
/// }
/// ```
pub trait InterfaceSource: Send + Sync {
    /// Enumerates every network interface on the system.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the platform API call fails.
    ///
    /// # Implementation Notes
    ///
    /// - Implementations should return ALL interfaces, in OS order
    /// - This is a synchronous operation and may block on OS I/O
    fn enumerate(&self) -> Result<Vec<RawInterface>, FetchError>;

    /// Returns true if the OS currently has an interface named `name`.
    ///
    /// Any failure of the underlying query counts as absence.
    fn exists_by_name(&self, name: &str) -> bool;

    /// Returns true if the OS currently has an interface with `index`.
    ///
    /// Any failure of the underlying query counts as absence.
    fn exists_by_index(&self, index: u32) -> bool;
}

impl<S: InterfaceSource + ?Sized> InterfaceSource for Box<S> {
    fn enumerate(&self) -> Result<Vec<RawInterface>, FetchError> {
        self.as_ref().enumerate()
    }

    fn exists_by_name(&self, name: &str) -> bool {
        self.as_ref().exists_by_name(name)
    }

    fn exists_by_index(&self, index: u32) -> bool {
        self.as_ref().exists_by_index(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_platform_displays_message() {
        let error = FetchError::Platform {
            message: "unsupported operation".to_string(),
        };
        assert!(error.to_string().contains("unsupported operation"));
    }

    #[test]
    fn fetch_error_conversion_names_interface_and_cause() {
        let error = FetchError::Conversion {
            interface: "utun3".to_string(),
            source: ConversionError::InvalidPrefixLen {
                addr: "10.8.0.2".parse().unwrap(),
                len: 40,
                reason: "too long".to_string(),
            },
        };

        let message = error.to_string();
        assert!(message.contains("utun3"));
        assert!(message.contains("/40"));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn boxed_source_delegates() {
        struct Fixed;

        impl InterfaceSource for Fixed {
            fn enumerate(&self) -> Result<Vec<RawInterface>, FetchError> {
                Ok(vec![RawInterface {
                    name: "lo".to_string(),
                    index: 1,
                    ..RawInterface::default()
                }])
            }

            fn exists_by_name(&self, name: &str) -> bool {
                name == "lo"
            }

            fn exists_by_index(&self, index: u32) -> bool {
                index == 1
            }
        }

        let source: Box<dyn InterfaceSource> = Box::new(Fixed);

        assert_eq!(source.enumerate().unwrap().len(), 1);
        assert!(source.exists_by_name("lo"));
        assert!(!source.exists_by_name("eth0"));
        assert!(source.exists_by_index(1));
        assert!(!source.exists_by_index(2));
    }
}
