//! Fetching a single echo service.

use http::HeaderValue;
use http::header::{ACCEPT, USER_AGENT};
use url::Url;

use super::{HttpClient, HttpRequest};

/// Capability to ask one echo service for the caller's address.
///
/// Every failure mode (transport error, non-success status, unreadable or
/// empty body) is reported as `None`; the resolver treats it as a missing
/// observation rather than an error.
pub trait EchoFetcher: Send + Sync {
    /// Fetches `url` and returns the trimmed, non-empty response body.
    fn fetch(&self, url: &Url) -> impl std::future::Future<Output = Option<String>> + Send;
}

/// [`EchoFetcher`] backed by an [`HttpClient`].
#[derive(Debug, Clone)]
pub struct HttpEchoFetcher<H> {
    client: H,
}

impl<H> HttpEchoFetcher<H> {
    /// Wraps an HTTP client.
    #[must_use]
    pub const fn new(client: H) -> Self {
        Self { client }
    }

    /// Returns the underlying HTTP client.
    #[must_use]
    pub const fn client(&self) -> &H {
        &self.client
    }
}

impl<H: HttpClient> EchoFetcher for HttpEchoFetcher<H> {
    async fn fetch(&self, url: &Url) -> Option<String> {
        let request = HttpRequest::get(url.clone())
            .with_header(ACCEPT, HeaderValue::from_static("text/plain"))
            .with_header(
                USER_AGENT,
                HeaderValue::from_static(concat!("ipnotify/", env!("CARGO_PKG_VERSION"))),
            );

        let response = match self.client.request(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Echo service {url} failed: {e}");
                return None;
            }
        };

        if !response.is_success() {
            tracing::debug!("Echo service {url} returned status {}", response.status);
            return None;
        }

        let Some(text) = response.body_text() else {
            tracing::debug!("Echo service {url} returned a non UTF-8 body");
            return None;
        };

        let value = text.trim();
        if value.is_empty() {
            tracing::debug!("Echo service {url} returned an empty body");
            return None;
        }

        Some(value.to_string())
    }
}
