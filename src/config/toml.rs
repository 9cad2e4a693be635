//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Echo service configuration
    #[serde(default)]
    pub resolver: ResolverSection,

    /// State persistence configuration
    #[serde(default)]
    pub state: StateSection,

    /// Email delivery configuration
    #[serde(default)]
    pub email: EmailSection,
}

/// Echo service configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverSection {
    /// Echo service URLs
    pub services: Option<Vec<String>>,

    /// Number of services asked per run
    pub query_count: Option<usize>,

    /// Request timeout in seconds
    pub timeout: Option<u64>,

    /// Ask services in configured order instead of sampling at random
    #[serde(default)]
    pub ordered: bool,
}

/// State persistence configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateSection {
    /// Path to the state file
    pub file: Option<String>,
}

/// Email delivery configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmailSection {
    /// Notification recipient
    pub recipient: Option<String>,

    /// Notification sender
    pub sender: Option<String>,

    /// SMTP relay host
    pub smtp_host: Option<String>,

    /// SMTP relay port
    pub smtp_port: Option<u16>,

    /// "starttls", "tls" or "none"
    pub security: Option<String>,

    /// SMTP user name
    pub username: Option<String>,

    /// Name of the environment variable holding the SMTP password
    pub password_env: Option<String>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
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
    r#"# ipnotify configuration file

[resolver]
# Echo services returning the caller's IP address as plain text
# Note: --service CLI flags REPLACE this list entirely
# services = [
#     "https://api.ipify.org/",
#     "https://icanhazip.com/",
#     "https://ident.me/",
#     "https://ipecho.net/plain",
#     "http://whatismyip.akamai.com",
# ]

# Number of services asked per run; all of them must agree (default: 3)
query_count = 3

# Timeout in seconds for each request and for the SMTP session (default: 10)
# timeout = 10

# Ask services in the order listed instead of picking at random
# ordered = false

[state]
# File holding "{address},{counter}"; its modification date is the day
# of the last notification (default: last_ip_address.txt)
# file = "last_ip_address.txt"

[email]
# Recipient (required here, via --recipient, or via $EMAIL_RECIPIENT)
# recipient = "me@example.com"

# Sender (default: the recipient)
# sender = "me@example.com"

# SMTP relay (default: smtp.sendgrid.net:587 with STARTTLS)
# smtp_host = "smtp.sendgrid.net"
# smtp_port = 587
# security = "starttls"

# SMTP user name (default: apikey)
# username = "apikey"

# Environment variable holding the SMTP password (default: SENDGRID_KEY)
# password_env = "SENDGRID_KEY"
"#
    .to_string()
}
