//! Error types for configuration parsing and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for configuration operations.
///
/// Covers errors from parsing, validation, and file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration or seed file.
    #[error("Failed to read file '{}': {source}", path.display())]
    FileRead {
        /// Path to the file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to write configuration file (for init command).
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid regex pattern for interface filtering.
    #[error("Invalid regex pattern '{pattern}': {source}")]
    InvalidRegex {
        /// The invalid pattern
        pattern: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// Invalid output format value.
    #[error("Invalid output format '{value}': expected text or json")]
    InvalidFormat {
        /// The invalid value provided
        value: String,
    },

    /// A seed entry has an invalid address prefix.
    #[error("Invalid address '{value}' for seeded interface '{interface}': {reason}")]
    InvalidPrefix {
        /// Name of the seeded interface
        interface: String,
        /// The invalid prefix string
        value: String,
        /// Reason for invalidity
        reason: String,
    },

    /// A seed entry has an invalid hardware address.
    #[error("Invalid hardware address '{value}' for seeded interface '{interface}'")]
    InvalidHardwareAddr {
        /// Name of the seeded interface
        interface: String,
        /// The invalid address string
        value: String,
    },

    /// Two seed entries share a name or an index.
    #[error("Duplicate seeded interface {key}")]
    DuplicateSeed {
        /// The duplicated key, e.g. `name 'eth0'` or `index 2`
        key: String,
    },

    /// A seed entry has an empty name.
    #[error("Seeded interface #{position} has an empty name")]
    EmptySeedName {
        /// 1-based position of the entry in the seed file
        position: usize,
    },
}
