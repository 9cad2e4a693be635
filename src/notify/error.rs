//! Error types for notification delivery.

use thiserror::Error;

/// Error type for notification operations.
///
/// Delivery is attempted exactly once; callers log these and move on.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The SMTP transport could not be set up or the relay rejected the message.
    #[error("SMTP error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The message could not be assembled.
    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    /// The background delivery task did not complete.
    #[error("Delivery task failed: {0}")]
    Interrupted(#[source] tokio::task::JoinError),
}
