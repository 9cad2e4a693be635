//! Configuration layer for ipnotify.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
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
//! 3. **Environment** - Only for the recipient (`EMAIL_RECIPIENT`) and the
//!    SMTP password (`SENDGRID_KEY`, or the variable named by `email.password_env`)
//! 4. **Built-in defaults** - Hardcoded default values
//!
//! The echo service list uses "replace" semantics: any `--service` flag
//! discards the TOML list.
//!
//! # Secrets
//!
//! The SMTP password is never read from the CLI or the TOML file, only from
//! the environment.

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;


pub use cli::{Cli, Command, SmtpSecurityArg};
pub use error::{ConfigError, field};
pub use self::toml::{TomlConfig, default_config_template};
pub use validated::{ValidatedConfig, write_default_config};
