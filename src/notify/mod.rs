//! Delivery of the single-line notification.
//!
//! This module provides:
//! - The delivery abstraction ([`Notifier`])
//! - SMTP delivery through a relay ([`SmtpNotifier`], [`EmailSettings`])

mod error;
mod smtp;


pub use error::NotifyError;
pub use smtp::{EmailSettings, SmtpNotifier, SmtpSecurity};

/// Sends one plain-text message to the configured recipient.
///
/// Implementations make a single attempt: no retries, no queuing.
pub trait Notifier: Send + Sync {
    /// Delivers `message`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] if the message could not be delivered.
    fn notify(
        &self,
        message: &str,
    ) -> impl std::future::Future<Output = Result<(), NotifyError>> + Send;
}

/// Mock notifier for testing.
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Records delivered messages; can be told to fail.
    #[derive(Debug, Default)]
    pub struct MockNotifier {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    impl MockNotifier {
        /// Creates a notifier that accepts every message.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a notifier whose deliveries always fail.
        #[must_use]
        pub fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        /// Returns every message passed to `notify`, including failed ones.
        ///
        /// # Panics
        ///
        /// Panics if the internal lock is poisoned (only in test code).
        #[must_use]
        pub fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Notifier for MockNotifier {
        async fn notify(&self, message: &str) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(message.to_string());
            if self.fail {
                return Err(NotifyError::Message(lettre::error::Error::MissingFrom));
            }
            Ok(())
        }
    }
}
