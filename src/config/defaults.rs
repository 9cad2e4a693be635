//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

use crate::notify::SmtpSecurity;

/// Echo services asked when none are configured.
///
/// `api.ipify.org` appends a newline to its answer; `whatismyip.akamai.com`
/// does not support HTTPS.
pub const SERVICES: &[&str] = &[
    "https://api.ipify.org/",
    "https://icanhazip.com/",
    "https://ident.me/",
    "https://ipecho.net/plain",
    "http://whatismyip.akamai.com",
];

/// Default number of echo services asked per run.
pub const QUERY_COUNT: usize = crate::orchestrator::DEFAULT_QUERY_COUNT;

/// Default timeout in seconds for network operations.
pub const TIMEOUT_SECS: u64 = 10;

/// Default state file, relative to the working directory.
pub const STATE_FILE: &str = "last_ip_address.txt";

/// Default SMTP relay.
pub const SMTP_HOST: &str = "smtp.sendgrid.net";

/// Default SMTP port with STARTTLS (submission).
pub const SMTP_PORT: u16 = 587;

/// Default SMTP port with implicit TLS (submissions).
pub const SMTP_TLS_PORT: u16 = 465;

/// Default SMTP port without encryption.
pub const SMTP_PLAINTEXT_PORT: u16 = 25;

/// Default SMTP user name.
pub const SMTP_USERNAME: &str = "apikey";

/// Environment variable holding the SMTP password unless configured otherwise.
pub const PASSWORD_ENV: &str = "SENDGRID_KEY";

/// Environment variable consulted for the recipient.
pub const RECIPIENT_ENV: &str = "EMAIL_RECIPIENT";

/// Default timeout as Duration.
#[must_use]
pub const fn timeout() -> Duration {
    Duration::from_secs(TIMEOUT_SECS)
}

/// Default SMTP port for a security mode.
#[must_use]
pub const fn smtp_port(security: SmtpSecurity) -> u16 {
    match security {
        SmtpSecurity::StartTls => SMTP_PORT,
        SmtpSecurity::Tls => SMTP_TLS_PORT,
        SmtpSecurity::Plaintext => SMTP_PLAINTEXT_PORT,
    }
}
