//! Choosing which echo services to query.

use rand::seq::IndexedRandom;
use url::Url;

/// Picks `count` distinct services out of the configured list.
///
/// Implementations must not return duplicates and must return
/// `min(count, services.len())` entries.
pub trait ServiceSelector: Send + Sync {
    /// Returns the services to query, in query order.
    fn select<'a>(&self, services: &'a [Url], count: usize) -> Vec<&'a Url>;
}

/// Uniform random sampling without replacement.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSelector;

impl ServiceSelector for RandomSelector {
    fn select<'a>(&self, services: &'a [Url], count: usize) -> Vec<&'a Url> {
        services
            .choose_multiple(&mut rand::rng(), count)
            .collect()
    }
}

/// Takes the first `count` services in configured order.
///
/// Useful when the service list is already curated and ordered by
/// preference.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderedSelector;

impl ServiceSelector for OrderedSelector {
    fn select<'a>(&self, services: &'a [Url], count: usize) -> Vec<&'a Url> {
        services.iter().take(count).collect()
    }
}
