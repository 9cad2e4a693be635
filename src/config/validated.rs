//! Validated configuration after merging CLI, TOML and environment sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lettre::message::Mailbox;
use url::Url;

use crate::notify::{EmailSettings, SmtpSecurity};

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args, an optional TOML
/// config and an environment lookup. The function validates all inputs and
/// returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Echo services to sample from (never empty)
    pub services: Vec<Url>,

    /// Number of services asked per run (at least 1)
    pub query_count: usize,

    /// Ask services in configured order instead of at random
    pub ordered: bool,

    /// Timeout for each echo request and for the SMTP session
    pub timeout: Duration,

    /// Path to the state file
    pub state_file: PathBuf,

    /// Mail delivery settings
    pub email: EmailSettings,

    /// Dry-run mode (decide and log without sending or saving)
    pub dry_run: bool,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ services: {}, query_count: {}, ordered: {}, timeout: {}s, state_file: {}, \
             recipient: {}, smtp: {}:{} ({}), auth: {}, dry_run: {} }}",
            self.services.len(),
            self.query_count,
            self.ordered,
            self.timeout.as_secs(),
            self.state_file.display(),
            self.email.recipient,
            self.email.smtp_host,
            self.email.smtp_port,
            self.email.security,
            self.email.password.is_some(),
            self.dry_run,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments, optional TOML
    /// config and an environment lookup.
    ///
    /// CLI arguments take precedence over TOML values, which take precedence
    /// over the environment. `env` is only consulted for the recipient and
    /// the SMTP password.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No recipient is available
    /// - An echo service URL or email address is invalid
    /// - The service list is empty
    /// - `query_count` or `timeout` is zero
    pub fn from_raw(
        cli: &Cli,
        toml: Option<&TomlConfig>,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let services = Self::resolve_services(cli, toml)?;
        let query_count = Self::resolve_query_count(cli, toml)?;
        let timeout = Self::resolve_timeout(cli, toml)?;

        // Ordered selection is TOML-only
        let ordered = toml.is_some_and(|t| t.resolver.ordered);

        let state_file = Self::resolve_state_file(cli, toml);
        let email = Self::build_email(cli, toml, env, timeout)?;

        Ok(Self {
            services,
            query_count,
            ordered,
            timeout,
            state_file,
            email,
            dry_run: cli.dry_run,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI, optional config file and
    /// the process environment.
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

        Self::from_raw(cli, toml.as_ref(), &process_env)
    }

    fn resolve_services(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Vec<Url>, ConfigError> {
        // CLI list replaces TOML list entirely
        let raw: Vec<&str> = if cli.services.is_empty() {
            toml.and_then(|t| t.resolver.services.as_ref()).map_or_else(
                || defaults::SERVICES.to_vec(),
                |list| list.iter().map(String::as_str).collect(),
            )
        } else {
            cli.services.iter().map(String::as_str).collect()
        };

        if raw.is_empty() {
            return Err(ConfigError::missing(
                field::SERVICES,
                "Use --service or list resolver.services in config file",
            ));
        }

        raw.into_iter().map(parse_service_url).collect()
    }

    fn resolve_query_count(cli: &Cli, toml: Option<&TomlConfig>) -> Result<usize, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let count = cli
            .query_count
            .or_else(|| toml.and_then(|t| t.resolver.query_count))
            .unwrap_or(defaults::QUERY_COUNT);

        if count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "query_count",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(count)
    }

    fn resolve_timeout(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Duration, ConfigError> {
        let seconds = cli
            .timeout
            .or_else(|| toml.and_then(|t| t.resolver.timeout))
            .unwrap_or(defaults::TIMEOUT_SECS);

        if seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(Duration::from_secs(seconds))
    }

    fn resolve_state_file(cli: &Cli, toml: Option<&TomlConfig>) -> PathBuf {
        if let Some(ref path) = cli.state_file {
            return path.clone();
        }

        toml.and_then(|t| t.state.file.as_ref())
            .map_or_else(|| PathBuf::from(defaults::STATE_FILE), PathBuf::from)
    }

    fn resolve_security(cli: &Cli, toml: Option<&TomlConfig>) -> Result<SmtpSecurity, ConfigError> {
        if let Some(arg) = cli.smtp_security {
            return Ok(arg.into());
        }

        toml.and_then(|t| t.email.security.as_deref())
            .map_or(Ok(SmtpSecurity::default()), parse_security)
    }

    fn build_email(
        cli: &Cli,
        toml: Option<&TomlConfig>,
        env: &dyn Fn(&str) -> Option<String>,
        timeout: Duration,
    ) -> Result<EmailSettings, ConfigError> {
        let section = toml.map(|t| &t.email);

        let recipient_str = cli
            .recipient
            .clone()
            .or_else(|| section.and_then(|s| s.recipient.clone()))
            .or_else(|| env(defaults::RECIPIENT_ENV))
            .ok_or_else(|| {
                ConfigError::missing(
                    field::RECIPIENT,
                    "Use --recipient, set email.recipient in config file, or set EMAIL_RECIPIENT",
                )
            })?;
        let recipient = parse_mailbox(field::RECIPIENT, &recipient_str)?;

        let sender = match cli
            .sender
            .as_deref()
            .or_else(|| section.and_then(|s| s.sender.as_deref()))
        {
            Some(value) => parse_mailbox("sender", value)?,
            None => recipient.clone(),
        };

        let security = Self::resolve_security(cli, toml)?;

        let smtp_host = cli
            .smtp_host
            .clone()
            .or_else(|| section.and_then(|s| s.smtp_host.clone()))
            .unwrap_or_else(|| defaults::SMTP_HOST.to_string());

        let smtp_port = cli
            .smtp_port
            .or_else(|| section.and_then(|s| s.smtp_port))
            .unwrap_or_else(|| defaults::smtp_port(security));

        let username = section
            .and_then(|s| s.username.clone())
            .unwrap_or_else(|| defaults::SMTP_USERNAME.to_string());

        let password_env = section
            .and_then(|s| s.password_env.as_deref())
            .unwrap_or(defaults::PASSWORD_ENV);
        let password = env(password_env);

        Ok(EmailSettings {
            smtp_host,
            smtp_port,
            security,
            username,
            password,
            sender,
            recipient,
            timeout,
        })
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

/// Reads a non-empty variable from the process environment.
fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_service_url(s: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(s).map_err(|e| ConfigError::InvalidUrl {
        url: s.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidUrl {
            url: s.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

fn parse_mailbox(field: &'static str, value: &str) -> Result<Mailbox, ConfigError> {
    value
        .parse::<Mailbox>()
        .map_err(|e| ConfigError::InvalidAddress {
            field,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn parse_security(s: &str) -> Result<SmtpSecurity, ConfigError> {
    match s.to_lowercase().as_str() {
        "starttls" => Ok(SmtpSecurity::StartTls),
        "tls" | "ssl" => Ok(SmtpSecurity::Tls),
        "none" | "plaintext" => Ok(SmtpSecurity::Plaintext),
        _ => Err(ConfigError::InvalidSecurity {
            value: s.to_string(),
        }),
    }
}
