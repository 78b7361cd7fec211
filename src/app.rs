//! Process-level plumbing for the `ifcache` binary: exit codes, hints
//! printed after configuration errors, and the log subscriber.

use ifcache::config::{ConfigError, defaults};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Exit codes returned by the binary.
pub mod exit_code {
    use std::process::ExitCode;

    /// The command ran and printed its result.
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Arguments, config file or seed file were rejected.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// Enumeration failed or no interface matched.
    ///
    /// `ExitCode::from` is not `const`, hence a function.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }
}

/// Returns a follow-up hint for a configuration error, if one helps.
fn config_hint(error: &ConfigError) -> Option<String> {
    match error {
        ConfigError::FileRead { path, .. }
            if path.file_name().is_some_and(|n| n == defaults::CONFIG_FILE) =>
        {
            Some(format!(
                "Run 'ifcache init' to write a commented {} template.",
                defaults::CONFIG_FILE
            ))
        }
        ConfigError::DuplicateSeed { .. } | ConfigError::EmptySeedName { .. } => Some(
            "Each [[interface]] in a seed file needs its own non-empty name and index.".to_string(),
        ),
        ConfigError::InvalidRegex { .. } => {
            Some("Filter patterns use Rust regex syntax, e.g. '^eth' or 'docker|veth'.".to_string())
        }
        _ => None,
    }
}

/// Prints the hint for `error` to stderr, if there is one.
pub fn print_config_hint(error: &ConfigError) {
    if let Some(hint) = config_hint(error) {
        eprintln!("\n{hint}");
    }
}

const fn default_level(verbose: bool) -> Level {
    if verbose { Level::DEBUG } else { Level::WARN }
}

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` overrides the default level. Output goes to stderr; stdout
/// carries only command results.
pub fn setup_tracing(verbose: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level(verbose).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
