//! Error types for echo-service HTTP operations.

use thiserror::Error;

/// Error type for a single echo-service request.
///
/// The resolver never propagates these; each one collapses into a missing
/// observation for the endpoint that produced it.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// Includes DNS resolution failures, refused connections and
    /// truncated response bodies.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The echo service did not answer within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The request could not be built for the given URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Errors raised while constructing the HTTP client.
#[derive(Debug, Error)]
#[error("Failed to build HTTP client: {0}")]
pub struct ClientBuildError(#[source] pub reqwest::Error);
