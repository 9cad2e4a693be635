//! Process-level concerns of the ipnotify binary.
//!
//! Exit statuses seen by cron, hints printed after configuration failures,
//! and the log subscriber that keeps ordinary runs silent.

use ipnotify::config::{ConfigError, field};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Exit statuses of one invocation.
pub mod exit_code {
    use std::process::ExitCode;

    /// The run completed, whether or not an email went out.
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Configuration could not be loaded or validated (1).
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// The state file could not be written or the HTTP client could not be built (2).
    // `ExitCode::from` is not const.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }
}

/// Points the user at `ipnotify init` when the recipient or config file is missing.
pub fn print_config_hint(error: &ConfigError) {
    let wants_template = match error {
        ConfigError::MissingRequired { field: f, .. } => *f == field::RECIPIENT,
        ConfigError::FileRead { .. } => true,
        _ => false,
    };

    if wants_template {
        eprintln!("\nRun 'ipnotify init' to write a configuration template.");
    }
}

/// Installs the stdout log subscriber.
///
/// Verbose runs log at DEBUG; otherwise only warnings and errors appear.
/// `RUST_LOG` overrides either level.
pub fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stdout)
        .init();
}
