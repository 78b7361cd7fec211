//! Configuration layer for ifcache.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Seed files with a fixed interface list ([`SeedFile`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! For filter patterns (`list --include`, `list --exclude`), CLI patterns **replace**
//! TOML patterns entirely (not merged). Include and exclude are handled independently.
//!
//! # Boolean Flag Semantics
//!
//! Boolean flags (`--up-only`, `--no-loopback`) use OR semantics:
//! if set in either CLI or TOML, the result is `true`.

mod cli;
pub mod defaults;
mod error;
mod seed;
mod toml;
mod validated;


pub use cli::{Cli, Command, FormatArg};
pub use error::ConfigError;
pub use seed::{SeedFile, SeedInterface};
pub use toml::{TomlConfig, default_config_template};
pub use validated::{OutputFormat, ValidatedConfig, write_default_config};
