//! SMTP delivery using lettre.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use super::{Notifier, NotifyError};

/// How the connection to the relay is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmtpSecurity {
    /// Plain connection upgraded with STARTTLS (usually port 587).
    #[default]
    StartTls,
    /// TLS from the first byte (usually port 465).
    Tls,
    /// No encryption. Only for local relays.
    Plaintext,
}

impl fmt::Display for SmtpSecurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartTls => write!(f, "starttls"),
            Self::Tls => write!(f, "tls"),
            Self::Plaintext => write!(f, "none"),
        }
    }
}

/// Everything needed to reach the relay and address the message.
///
/// Built by the configuration layer; nothing here reads the environment.
#[derive(Clone)]
pub struct EmailSettings {
    /// Relay host name
    pub smtp_host: String,
    /// Relay port
    pub smtp_port: u16,
    /// Connection security
    pub security: SmtpSecurity,
    /// SMTP user name
    pub username: String,
    /// SMTP password; no authentication is attempted without one
    pub password: Option<String>,
    /// `From` address
    pub sender: Mailbox,
    /// `To` address
    pub recipient: Mailbox,
    /// Connection and command timeout
    pub timeout: Duration,
}

impl fmt::Debug for EmailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailSettings")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("security", &self.security)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("sender", &self.sender.to_string())
            .field("recipient", &self.recipient.to_string())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// [`Notifier`] that sends the message as both subject and body of one email.
///
/// lettre's SMTP transport is blocking, so delivery runs on the blocking
/// thread pool.
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: Arc<SmtpTransport>,
    sender: Mailbox,
    recipient: Mailbox,
}

impl fmt::Debug for SmtpNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpNotifier")
            .field("sender", &self.sender.to_string())
            .field("recipient", &self.recipient.to_string())
            .finish_non_exhaustive()
    }
}

impl SmtpNotifier {
    /// Creates a notifier for the given settings.
    ///
    /// No connection is opened until the first message is sent.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Transport`] if the TLS parameters for the relay
    /// cannot be built.
    pub fn new(settings: &EmailSettings) -> Result<Self, NotifyError> {
        let builder = match settings.security {
            SmtpSecurity::StartTls => SmtpTransport::starttls_relay(&settings.smtp_host)?,
            SmtpSecurity::Tls => SmtpTransport::relay(&settings.smtp_host)?,
            SmtpSecurity::Plaintext => SmtpTransport::builder_dangerous(&settings.smtp_host),
        };

        let mut builder = builder
            .port(settings.smtp_port)
            .timeout(Some(settings.timeout));

        if let Some(ref password) = settings.password {
            builder = builder.credentials(Credentials::new(
                settings.username.clone(),
                password.clone(),
            ));
        }

        Ok(Self {
            transport: Arc::new(builder.build()),
            sender: settings.sender.clone(),
            recipient: settings.recipient.clone(),
        })
    }

    /// Assembles the email for `message`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Message`] if lettre rejects the message.
    pub fn build_message(&self, message: &str) -> Result<Message, NotifyError> {
        let email = Message::builder()
            .from(self.sender.clone())
            .to(self.recipient.clone())
            .subject(message)
            .header(ContentType::TEXT_PLAIN)
            .body(message.to_string())?;

        Ok(email)
    }
}

impl Notifier for SmtpNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let email = self.build_message(message)?;
        let transport = Arc::clone(&self.transport);

        tracing::debug!("Sending email to {}...", self.recipient);
        let response = tokio::task::spawn_blocking(move || transport.send(&email))
            .await
            .map_err(NotifyError::Interrupted)??;

        tracing::debug!("...email sent (SMTP {})", response.code());
        Ok(())
    }
}
