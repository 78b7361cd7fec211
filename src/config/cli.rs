//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// ifcache: cached network interface lookups
///
/// Lists the host's network interfaces and looks them up by name,
/// index, or contained address, refreshing the cache on a miss.
#[derive(Debug, Parser)]
#[command(name = "ifcache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Path to a seed file; its interfaces are installed before any lookup
    #[arg(long, global = true, value_name = "PATH")]
    pub seed: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, global = true)]
    pub format: Option<FormatArg>,

    /// Shorthand for --format json
    #[arg(long, global = true, conflicts_with = "format")]
    pub json: bool,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for ifcache
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List all interfaces
    List {
        /// Regex pattern for interfaces to include (can be specified multiple times)
        #[arg(long = "include", value_name = "PATTERN")]
        include: Vec<String>,

        /// Regex pattern for interfaces to exclude (can be specified multiple times)
        #[arg(long = "exclude", value_name = "PATTERN")]
        exclude: Vec<String>,

        /// Only list interfaces that are up
        #[arg(long = "up-only")]
        up_only: bool,

        /// Hide loopback interfaces
        #[arg(long = "no-loopback")]
        no_loopback: bool,
    },

    /// Look up an interface by name
    Name {
        /// Interface name, e.g. eth0
        name: String,
    },

    /// Look up an interface by index
    Index {
        /// OS interface index
        index: u32,
    },

    /// Find the interface whose prefix contains an address
    Addr {
        /// IPv4 or IPv6 address
        addr: IpAddr,
    },

    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "ifcache.toml")]
        output: PathBuf,
    },
}

/// Output format argument for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Human-readable lines
    #[value(name = "text")]
    Text,
    /// Pretty-printed JSON
    #[value(name = "json")]
    Json,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }
}
