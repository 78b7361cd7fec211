//! ifcache: cached network interface lookups
//!
//! A library for keeping a thread-safe snapshot of the host's network
//! interfaces and looking them up by name, index, or contained address.
//! Name and index misses probe the OS and refresh the snapshot once.

pub mod config;
pub mod network;
