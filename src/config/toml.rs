//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Cache configuration section
    #[serde(default)]
    pub cache: CacheSection,

    /// Listing filter configuration
    #[serde(default)]
    pub filter: FilterSection,

    /// Output configuration
    #[serde(default)]
    pub output: OutputSection,
}

/// Cache configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheSection {
    /// Seed file whose interfaces are installed before any lookup.
    /// Relative paths are resolved against the config file's directory.
    pub seed: Option<PathBuf>,

    /// Enumerate the OS once before running the command
    pub refresh_on_start: Option<bool>,
}

/// Listing filter configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSection {
    /// Regex patterns for interfaces to include
    #[serde(default)]
    pub include: Vec<String>,

    /// Regex patterns for interfaces to exclude
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Only list interfaces that are up
    #[serde(default)]
    pub up_only: bool,

    /// Hide loopback interfaces
    #[serde(default)]
    pub exclude_loopback: bool,
}

/// Output configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    /// Output format: "text" or "json"
    pub format: Option<String>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// A relative `cache.seed` path is resolved against the directory
    /// containing the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut config = Self::parse(&content)?;
        if let (Some(seed), Some(dir)) = (config.cache.seed.as_mut(), path.parent()) {
            if seed.is_relative() {
                *seed = dir.join(&*seed);
            }
        }
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# ifcache Configuration File

[cache]
# Seed file with a fixed interface list, installed before any lookup.
# Useful in sandboxes where enumerating the OS is unavailable or undesired.
# Relative paths are resolved against this file's directory.
# seed = "interfaces.toml"

# Enumerate the OS once before running the command.
# Default: true for `list` and `addr` without a seed, false otherwise
# (name and index lookups refresh on demand when they miss).
# refresh_on_start = true

[filter]
# Regex patterns for interfaces to include in listings (empty = all)
# Note: CLI patterns REPLACE these entirely (not merged)
# include = ["^eth", "^en"]

# Regex patterns for interfaces to exclude from listings
# Note: CLI patterns REPLACE these entirely (not merged)
# exclude = ["^docker", "^veth"]

# Only list interfaces that are up
# up_only = false

# Hide loopback interfaces
# exclude_loopback = false

[output]
# Output format: "text" or "json" (default: text)
# format = "text"
"#
    .to_string()
}
