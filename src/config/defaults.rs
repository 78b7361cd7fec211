//! Default values for configuration options.
//!
//! Centralized constants to avoid magic values scattered across the codebase.

use super::validated::OutputFormat;

/// Default output format.
pub const FORMAT: OutputFormat = OutputFormat::Text;

/// Default path written by `ifcache init`.
pub const CONFIG_FILE: &str = "ifcache.toml";
