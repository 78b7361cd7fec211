//! Interface filtering for listings.
//!
//! # Design
//!
//! - **Pure Matchers**: [`NameRegexFilter`] and [`FlagFilter`] only answer
//!   "does this interface match?" without include/exclude semantics.
//! - **Filter Chain**: [`FilterChain`] combines matchers with correct semantics:
//!   - Exclude filters: AND logic (must pass ALL excludes)
//!   - Include filters: OR logic (pass ANY include, empty = match all)
//!
//! Filters are applied to listings only. The cache itself always holds every
//! interface the OS reported.

use regex::Regex;

use super::Interface;

/// Trait for filtering network interfaces.
///
/// Filters must be `Send + Sync` so a chain can be shared between threads.
pub trait InterfaceFilter: Send + Sync {
    /// Returns `true` if the interface matches this filter.
    fn matches(&self, iface: &Interface) -> bool;
}

// ============================================================================
// NameRegexFilter - Pure matcher by name pattern
// ============================================================================

/// Matches interfaces whose name matches a regex.
///
/// # Examples
///
/// ```
/// use ifcache::network::Interface;
/// use ifcache::network::filter::{InterfaceFilter, NameRegexFilter};
///
/// let filter = NameRegexFilter::new("^(eth|en)").unwrap();
///
/// assert!(filter.matches(&Interface::new("eth0", 2, vec![])));
/// assert!(!filter.matches(&Interface::new("docker0", 5, vec![])));
/// ```
#[derive(Debug)]
pub struct NameRegexFilter {
    pattern: Regex,
}

impl NameRegexFilter {
    /// Creates a name filter from a regex pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid regex.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// Returns the compiled pattern.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Regex is not a const type
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

impl InterfaceFilter for NameRegexFilter {
    fn matches(&self, iface: &Interface) -> bool {
        self.pattern.is_match(&iface.name)
    }
}

// ============================================================================
// FlagFilter - Pure matcher by interface flags
// ============================================================================

/// Matches interfaces by a single flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagFilter {
    /// Matches interfaces that are down.
    Down,
    /// Matches loopback interfaces.
    Loopback,
}

impl InterfaceFilter for FlagFilter {
    fn matches(&self, iface: &Interface) -> bool {
        match self {
            Self::Down => !iface.flags.up,
            Self::Loopback => iface.flags.loopback,
        }
    }
}

// ============================================================================
// FilterChain - Include OR / Exclude AND semantics
// ============================================================================

/// Combines matchers with include/exclude semantics.
///
/// 1. If any exclude filter matches, the interface is rejected.
/// 2. If there are no include filters, the interface is accepted.
/// 3. Otherwise the interface is accepted if any include filter matches.
///
/// # Examples
///
/// ```
/// use ifcache::network::Interface;
/// use ifcache::network::filter::{FilterChain, FlagFilter, InterfaceFilter, NameRegexFilter};
///
/// let chain = FilterChain::new()
///     .include(NameRegexFilter::new("^eth").unwrap())
///     .exclude(FlagFilter::Loopback);
///
/// assert!(chain.matches(&Interface::new("eth0", 2, vec![])));
/// assert!(!chain.matches(&Interface::new("wlan0", 3, vec![])));
/// ```
#[derive(Default)]
pub struct FilterChain {
    includes: Vec<Box<dyn InterfaceFilter>>,
    excludes: Vec<Box<dyn InterfaceFilter>>,
}

impl FilterChain {
    /// Creates an empty chain that matches every interface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an include filter (OR semantics among includes).
    #[must_use]
    pub fn include<F: InterfaceFilter + 'static>(mut self, filter: F) -> Self {
        self.includes.push(Box::new(filter));
        self
    }

    /// Adds an exclude filter (any match rejects).
    #[must_use]
    pub fn exclude<F: InterfaceFilter + 'static>(mut self, filter: F) -> Self {
        self.excludes.push(Box::new(filter));
        self
    }

    /// Returns the number of include filters.
    #[must_use]
    pub fn include_count(&self) -> usize {
        self.includes.len()
    }

    /// Returns the number of exclude filters.
    #[must_use]
    pub fn exclude_count(&self) -> usize {
        self.excludes.len()
    }

    /// Returns true if the chain has no filters (matches everything).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }

    /// Returns the interfaces from `interfaces` that pass the chain, in order.
    #[must_use]
    pub fn apply<'a>(&self, interfaces: &'a [Interface]) -> Vec<&'a Interface> {
        interfaces.iter().filter(|i| self.matches(i)).collect()
    }
}

impl InterfaceFilter for FilterChain {
    fn matches(&self, iface: &Interface) -> bool {
        if self.excludes.iter().any(|f| f.matches(iface)) {
            return false;
        }

        self.includes.is_empty() || self.includes.iter().any(|f| f.matches(iface))
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("include_count", &self.includes.len())
            .field("exclude_count", &self.excludes.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
