//! Command execution.
//!
//! Builds the interface cache, installs the seed or takes an initial
//! snapshot, then runs one lookup or listing and prints the result.

use std::io::{self, Write};

use serde::Serialize;
use thiserror::Error;

use ifcache::config::{Command, OutputFormat, ValidatedConfig};
use ifcache::network::{FinderError, Interface, InterfaceCache, InterfaceFinder};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The initial snapshot could not be taken.
    #[error("Failed to enumerate interfaces: {0}")]
    InitialUpdate(#[source] FinderError),

    /// A lookup failed.
    #[error(transparent)]
    Lookup(FinderError),

    /// Failed to serialize output.
    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Failed to write output.
    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl RunError {
    /// Returns true if the error means a lookup found nothing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Lookup(e) if e.is_not_found())
    }
}

/// Executes a lookup or listing command against the host's interfaces.
///
/// This function:
/// 1. Creates the platform-backed cache
/// 2. Installs the seeded interfaces, if any
/// 3. Takes an initial snapshot when configured to
/// 4. Runs the command and prints the result to stdout
///
/// # Errors
///
/// Returns an error if the initial snapshot fails, the lookup fails,
/// or the output cannot be written.
pub fn execute(config: &ValidatedConfig, command: &Command) -> Result<(), RunError> {
    let cache = InterfaceCache::platform();
    prepare(&cache, config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_command(&cache, config, command, &mut out)
}

/// Installs the seed and takes the initial snapshot.
fn prepare<F: InterfaceFinder + ?Sized>(
    finder: &F,
    config: &ValidatedConfig,
) -> Result<(), RunError> {
    if let Some(ref seed) = config.seed {
        tracing::debug!("Installing {} seeded interface(s)", seed.len());
        finder.update_interfaces(seed.clone());
    }

    if config.refresh_on_start {
        finder.update().map_err(RunError::InitialUpdate)?;
    }

    Ok(())
}

/// Runs a single command against `finder` and writes the result to `out`.
fn run_command<F, W>(
    finder: &F,
    config: &ValidatedConfig,
    command: &Command,
    out: &mut W,
) -> Result<(), RunError>
where
    F: InterfaceFinder + ?Sized,
    W: Write,
{
    match command {
        Command::List { .. } => {
            let all = finder.interfaces();
            let listed = config.filter.apply(&all);
            tracing::debug!("Listing {} of {} interface(s)", listed.len(), all.len());
            print_list(out, &listed, config.format)
        }
        Command::Name { name } => print_one(out, &lookup(finder.by_name(name))?, config.format),
        Command::Index { index } => {
            print_one(out, &lookup(finder.by_index(*index))?, config.format)
        }
        Command::Addr { addr } => print_one(out, &lookup(finder.by_addr(*addr))?, config.format),
        // Handled before configuration is loaded
        Command::Init { .. } => Ok(()),
    }
}

fn lookup(result: Result<Interface, FinderError>) -> Result<Interface, RunError> {
    result.map_err(RunError::Lookup)
}

fn print_list<W: Write>(
    out: &mut W,
    interfaces: &[&Interface],
    format: OutputFormat,
) -> Result<(), RunError> {
    match format {
        OutputFormat::Text => {
            for iface in interfaces {
                writeln!(out, "{iface}")?;
            }
            Ok(())
        }
        OutputFormat::Json => print_json(out, &interfaces),
    }
}

fn print_one<W: Write>(
    out: &mut W,
    interface: &Interface,
    format: OutputFormat,
) -> Result<(), RunError> {
    match format {
        OutputFormat::Text => {
            writeln!(out, "{interface}")?;
            Ok(())
        }
        OutputFormat::Json => print_json(out, interface),
    }
}

fn print_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<(), RunError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
