//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::notify::SmtpSecurity;

/// ipnotify: emails the external IP address when it changes
///
/// Asks several echo services for the external address, and sends one
/// email when they agree on a new address, when none was sent today,
/// or during the initial burst of notifications.
#[derive(Debug, Parser)]
#[command(name = "ipnotify")]
#[command(about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Echo service URL (can be specified multiple times; replaces the configured list)
    #[arg(long = "service", value_name = "URL")]
    pub services: Vec<String>,

    /// Number of echo services to ask per run
    #[arg(long = "query-count", value_name = "N")]
    pub query_count: Option<usize>,

    /// Timeout in seconds for each echo request and for the SMTP session
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Notification recipient (falls back to $EMAIL_RECIPIENT)
    #[arg(long)]
    pub recipient: Option<String>,

    /// Notification sender (defaults to the recipient)
    #[arg(long)]
    pub sender: Option<String>,

    /// SMTP relay host
    #[arg(long = "smtp-host")]
    pub smtp_host: Option<String>,

    /// SMTP relay port
    #[arg(long = "smtp-port")]
    pub smtp_port: Option<u16>,

    /// SMTP connection security
    #[arg(long = "smtp-security", value_enum)]
    pub smtp_security: Option<SmtpSecurityArg>,

    /// Path to configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Path to the state file holding the last notified address
    #[arg(long = "state-file")]
    pub state_file: Option<PathBuf>,

    /// Test mode - decide and log without sending email or saving state
    #[arg(long)]
    pub dry_run: bool,

    /// Print diagnostics while running (-v and -V are equivalent)
    #[arg(long, short = 'v', short_alias = 'V')]
    pub verbose: bool,
}

/// Subcommands for ipnotify
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "ipnotify.toml")]
        output: PathBuf,
    },
}

/// SMTP security argument for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SmtpSecurityArg {
    /// Upgrade a plain connection with STARTTLS
    #[value(name = "starttls")]
    StartTls,
    /// Implicit TLS
    #[value(name = "tls")]
    Tls,
    /// No encryption
    #[value(name = "none")]
    Plaintext,
}

impl From<SmtpSecurityArg> for SmtpSecurity {
    fn from(arg: SmtpSecurityArg) -> Self {
        match arg {
            SmtpSecurityArg::StartTls => Self::StartTls,
            SmtpSecurityArg::Tls => Self::Tls,
            SmtpSecurityArg::Plaintext => Self::Plaintext,
        }
    }
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

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }
}
