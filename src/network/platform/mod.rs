//! Platform-specific interface source implementations.
//!
//! This module provides conditional compilation for platform-specific
//! implementations of the [`InterfaceSource`](super::InterfaceSource) trait.
//!
//! # Platform Support
//!
//! - **Unix**: `getifaddrs` and `if_nametoindex` via the `nix` crate.
//! - **Windows**: `GetAdaptersAddresses` via the `windows` crate.

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use unix::UnixSource;
#[cfg(windows)]
pub use windows::WindowsSource;

// Re-export the platform-specific source as PlatformSource for convenience
#[cfg(unix)]
pub use unix::UnixSource as PlatformSource;
#[cfg(windows)]
pub use windows::WindowsSource as PlatformSource;
