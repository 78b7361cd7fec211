//! Network layer for enumerating, caching, and looking up interfaces.
//!
//! This module provides types and traits for:
//! - Representing interface snapshots ([`Interface`])
//! - Raw OS records and their conversion ([`RawInterface`])
//! - The OS collaborator contract ([`InterfaceSource`])
//! - The cached lookup surface ([`InterfaceCache`], [`InterfaceFinder`])
//! - Name-based filtering of listings ([`filter`])
//! - Platform-specific implementations ([`platform`])

mod cache;
pub mod filter;
mod interface;
pub mod platform;
mod source;


pub use cache::{FinderError, InterfaceCache, InterfaceFinder, Lookup};
pub use interface::{
    HardwareAddr, Interface, InterfaceFlags, ParseHardwareAddrError, RawAddress, RawInterface,
    RawMask,
};
pub use source::{ConversionError, FetchError, InterfaceSource};
