//! Consensus resolution of the external address across echo services.

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinSet;
use url::Url;

use super::{EchoFetcher, RandomSelector, ServiceSelector};

/// What one echo service answered during a resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// The queried endpoint.
    pub url: Url,
    /// Trimmed, non-empty body, or `None` if the service failed.
    pub value: Option<String>,
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.url, self.value.as_deref().unwrap_or("None"))
    }
}

/// Outcome of one resolution attempt.
///
/// Exactly one of `consensus_address` and `diagnostic` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    /// The agreed address, when every queried service returned the same value.
    pub consensus_address: Option<String>,
    /// Human-readable explanation listing every queried service, when there
    /// was no consensus.
    pub diagnostic: Option<String>,
    /// Per-service results in query order.
    pub observations: Vec<Observation>,
}

impl ResolutionResult {
    /// Applies the consensus rule to the observations of `requested` services.
    ///
    /// Consensus requires `requested` successful responses that are all
    /// identical. Duplicate values count toward the number of responders.
    #[must_use]
    pub fn from_observations(requested: usize, observations: Vec<Observation>) -> Self {
        let values: Vec<&str> = observations
            .iter()
            .filter_map(|o| o.value.as_deref())
            .collect();

        let agreed = values.len() == requested
            && values.first().is_some_and(|first| values.iter().all(|v| v == first));

        if agreed {
            let consensus_address = values.first().map(|v| (*v).to_string());
            return Self {
                consensus_address,
                diagnostic: None,
                observations,
            };
        }

        let listing = observations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            consensus_address: None,
            diagnostic: Some(format!("No consensus. IP addresses: {listing}")),
            observations,
        }
    }

    /// Returns true if the services agreed on an address.
    #[must_use]
    pub const fn has_consensus(&self) -> bool {
        self.consensus_address.is_some()
    }
}

/// Queries a sample of echo services and reduces their answers to one address.
///
/// Each selected service is fetched once, concurrently. Results are placed by
/// selection index, so completion order never changes the outcome.
pub struct IpResolver<F> {
    fetcher: Arc<F>,
    services: Vec<Url>,
    selector: Box<dyn ServiceSelector>,
}

impl<F> fmt::Debug for IpResolver<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IpResolver")
            .field("services", &self.services.len())
            .finish_non_exhaustive()
    }
}

impl<F: EchoFetcher + 'static> IpResolver<F> {
    /// Creates a resolver over `services` that samples them at random.
    #[must_use]
    pub fn new(fetcher: F, services: Vec<Url>) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            services,
            selector: Box::new(RandomSelector),
        }
    }

    /// Replaces the service selection strategy.
    #[must_use]
    pub fn with_selector(mut self, selector: impl ServiceSelector + 'static) -> Self {
        self.selector = Box::new(selector);
        self
    }

    /// Returns the fetcher used for every query.
    #[must_use]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Returns the configured services.
    #[must_use]
    pub fn services(&self) -> &[Url] {
        &self.services
    }

    /// Resolves the external address by asking `requested` services.
    ///
    /// `requested` is clamped to the number of configured services.
    pub async fn resolve(&self, requested: usize) -> ResolutionResult {
        let count = requested.clamp(1, self.services.len().max(1));
        let selected: Vec<Url> = self
            .selector
            .select(&self.services, count)
            .into_iter()
            .cloned()
            .collect();

        let mut tasks = JoinSet::new();
        for (index, url) in selected.iter().cloned().enumerate() {
            let fetcher = Arc::clone(&self.fetcher);
            tasks.spawn(async move {
                let value = fetcher.fetch(&url).await;
                (index, value)
            });
        }

        let mut values: Vec<Option<String>> = vec![None; selected.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, value)) => values[index] = value,
                Err(e) => tracing::warn!("Echo service task failed: {e}"),
            }
        }

        let observations: Vec<Observation> = selected
            .into_iter()
            .zip(values)
            .map(|(url, value)| Observation { url, value })
            .collect();

        for observation in &observations {
            tracing::debug!("Echo service {observation}");
        }

        let result = ResolutionResult::from_observations(count, observations);
        if let Some(ref diagnostic) = result.diagnostic {
            tracing::info!("Special case: {diagnostic}");
        }
        result
    }
}
