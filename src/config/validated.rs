//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::network::Interface;
use crate::network::filter::{FilterChain, FlagFilter, NameRegexFilter};

use super::cli::{Cli, Command, FormatArg};
use super::defaults;
use super::error::ConfigError;
use super::seed::SeedFile;
use super::toml::TomlConfig;

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One human-readable line per interface.
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs (including the seed file, if any) and
/// returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Interfaces to install before running the command, if a seed was given
    pub seed: Option<Vec<Interface>>,

    /// Where the seed was loaded from
    pub seed_path: Option<PathBuf>,

    /// Whether to enumerate the OS once before running the command
    pub refresh_on_start: bool,

    /// Filter applied to `list` output
    pub filter: FilterChain,

    /// Output format
    pub format: OutputFormat,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seed_str = self.seed_path.as_ref().map_or_else(
            || "none".to_string(),
            |p| {
                format!(
                    "{} ({} interface(s))",
                    p.display(),
                    self.seed.as_ref().map_or(0, Vec::len)
                )
            },
        );

        write!(
            f,
            "Config {{ seed: {}, refresh_on_start: {}, format: {}, filters: {}+{} }}",
            seed_str,
            self.refresh_on_start,
            self.format,
            self.filter.include_count(),
            self.filter.exclude_count(),
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Regex patterns are invalid
    /// - The output format is unknown
    /// - The seed file cannot be read, parsed, or validated
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let seed_path = Self::resolve_seed_path(cli, toml);
        let seed = seed_path
            .as_deref()
            .map(|path| SeedFile::load(path)?.into_interfaces())
            .transpose()?;

        // Name and index lookups refresh on miss; listing and address
        // lookups only ever see the current snapshot
        let refresh_on_start = toml
            .and_then(|t| t.cache.refresh_on_start)
            .unwrap_or_else(|| {
                matches!(cli.command, Command::List { .. } | Command::Addr { .. }) && seed.is_none()
            });

        Ok(Self {
            seed,
            seed_path,
            refresh_on_start,
            filter: Self::build_filter(cli, toml)?,
            format: Self::resolve_format(cli, toml)?,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_seed_path(cli: &Cli, toml: Option<&TomlConfig>) -> Option<PathBuf> {
        // CLI takes precedence
        cli.seed
            .clone()
            .or_else(|| toml.and_then(|t| t.cache.seed.clone()))
    }

    fn resolve_format(cli: &Cli, toml: Option<&TomlConfig>) -> Result<OutputFormat, ConfigError> {
        // Priority: --json > --format > TOML > default
        if cli.json {
            return Ok(OutputFormat::Json);
        }
        if let Some(format) = cli.format {
            return Ok(format.into());
        }

        toml.and_then(|t| t.output.format.as_deref())
            .map_or(Ok(defaults::FORMAT), parse_format)
    }

    fn build_filter(cli: &Cli, toml: Option<&TomlConfig>) -> Result<FilterChain, ConfigError> {
        let (cli_include, cli_exclude, cli_up_only, cli_no_loopback) = match &cli.command {
            Command::List {
                include,
                exclude,
                up_only,
                no_loopback,
            } => (
                include.as_slice(),
                exclude.as_slice(),
                *up_only,
                *no_loopback,
            ),
            _ => (&[][..], &[][..], false, false),
        };
        let section = toml.map(|t| &t.filter);

        // CLI patterns replace TOML patterns entirely
        let include = if cli_include.is_empty() {
            section.map_or(&[][..], |s| &s.include[..])
        } else {
            cli_include
        };
        let exclude = if cli_exclude.is_empty() {
            section.map_or(&[][..], |s| &s.exclude[..])
        } else {
            cli_exclude
        };

        let mut chain = FilterChain::new();
        for pattern in include {
            chain = chain.include(compile(pattern)?);
        }
        for pattern in exclude {
            chain = chain.exclude(compile(pattern)?);
        }

        // Boolean flags only enable, never disable
        if cli_up_only || section.is_some_and(|s| s.up_only) {
            chain = chain.exclude(FlagFilter::Down);
        }
        if cli_no_loopback || section.is_some_and(|s| s.exclude_loopback) {
            chain = chain.exclude(FlagFilter::Loopback);
        }

        Ok(chain)
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

// Helper functions

fn compile(pattern: &str) -> Result<NameRegexFilter, ConfigError> {
    NameRegexFilter::new(pattern).map_err(|e| ConfigError::InvalidRegex {
        pattern: pattern.to_string(),
        source: e,
    })
}

fn parse_format(s: &str) -> Result<OutputFormat, ConfigError> {
    match s.to_lowercase().as_str() {
        "text" | "plain" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        _ => Err(ConfigError::InvalidFormat {
            value: s.to_string(),
        }),
    }
}
