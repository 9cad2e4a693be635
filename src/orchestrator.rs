//! One invocation of the resolve-decide-notify pipeline.

use std::fmt;

use thiserror::Error;

use crate::decision::{NotificationDecision, decide};
use crate::echo::{EchoFetcher, IpResolver, ResolutionResult};
use crate::notify::Notifier;
use crate::state::{LoadResult, PersistedState, StateError, StateStore};
use crate::time::{Clock, SystemClock, format_date};

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;

/// Default number of echo services asked per invocation.
pub const DEFAULT_QUERY_COUNT: usize = 3;

/// Error type for a failed invocation.
///
/// Only a failed state write is fatal; every other problem is absorbed
/// and reported through [`Outcome`].
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Failed to persist the state after deciding to notify.
    #[error("Failed to save state: {0}")]
    StateSave(#[source] StateError),
}

/// What happened to the notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The policy did not call for a notification.
    NotAttempted,
    /// Dry-run mode: the notification was only logged.
    DryRun,
    /// The notifier accepted the message.
    Sent,
    /// The notifier failed; the reason is kept for reporting.
    Failed(String),
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAttempted => write!(f, "not attempted"),
            Self::DryRun => write!(f, "dry run"),
            Self::Sent => write!(f, "sent"),
            Self::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}

/// Everything one invocation observed and did.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// State as loaded at the start of the invocation.
    pub previous: PersistedState,
    /// Result of querying the echo services.
    pub resolution: ResolutionResult,
    /// The policy decision.
    pub decision: NotificationDecision,
    /// What happened to the notification.
    pub delivery: Delivery,
    /// Whether the state record was rewritten.
    pub saved: bool,
}

/// Sequences load, resolve, decide, notify and save.
///
/// # Type Parameters
///
/// - `S`: state store
/// - `F`: echo fetcher used by the resolver
/// - `N`: notifier
/// - `C`: clock supplying "today" (defaults to [`SystemClock`])
#[derive(Debug)]
pub struct Orchestrator<S, F, N, C = SystemClock> {
    store: S,
    resolver: IpResolver<F>,
    notifier: N,
    clock: C,
    query_count: usize,
    dry_run: bool,
}

impl<S, F, N> Orchestrator<S, F, N, SystemClock> {
    /// Creates an orchestrator using the system clock and the default
    /// query count.
    #[must_use]
    pub fn new(store: S, resolver: IpResolver<F>, notifier: N) -> Self {
        Self {
            store,
            resolver,
            notifier,
            clock: SystemClock,
            query_count: DEFAULT_QUERY_COUNT,
            dry_run: false,
        }
    }
}

impl<S, F, N, C> Orchestrator<S, F, N, C> {
    /// Sets a custom clock.
    ///
    /// This is primarily useful for testing day boundaries.
    #[must_use]
    pub fn with_clock<C2>(self, clock: C2) -> Orchestrator<S, F, N, C2> {
        Orchestrator {
            store: self.store,
            resolver: self.resolver,
            notifier: self.notifier,
            clock,
            query_count: self.query_count,
            dry_run: self.dry_run,
        }
    }

    /// Sets how many echo services are asked per invocation.
    #[must_use]
    pub const fn with_query_count(mut self, count: usize) -> Self {
        self.query_count = count;
        self
    }

    /// Enables dry-run mode: decide and log, but neither send nor save.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Returns the state store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the notifier.
    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }
}

impl<S, F, N, C> Orchestrator<S, F, N, C>
where
    S: StateStore,
    F: EchoFetcher + 'static,
    N: Notifier,
    C: Clock,
{
    /// Runs one invocation.
    ///
    /// State is persisted only when a notification was decided, and is
    /// persisted even if delivery failed.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::StateSave`] if the state cannot be written.
    pub async fn run(&self) -> Result<Outcome, OrchestratorError> {
        let today = self.clock.today();
        let previous = self.load_state(today);

        let resolution = self.resolver.resolve(self.query_count).await;

        let decision = decide(
            &previous.ip_address,
            previous.notifications_sent_today,
            previous.last_notified_date,
            today,
            resolution.consensus_address.as_deref(),
            resolution.diagnostic.as_deref(),
        );

        if !decision.should_notify {
            tracing::info!("No action taken, no changes found.");
            return Ok(Outcome {
                previous,
                resolution,
                decision,
                delivery: Delivery::NotAttempted,
                saved: false,
            });
        }

        log_conditions(&previous, &decision, today);

        if self.dry_run {
            tracing::info!("Dry-run: would send \"{}\"", decision.message);
            return Ok(Outcome {
                previous,
                resolution,
                decision,
                delivery: Delivery::DryRun,
                saved: false,
            });
        }

        let delivery = match self.notifier.notify(&decision.message).await {
            Ok(()) => Delivery::Sent,
            Err(e) => {
                tracing::error!("Notification failed: {e}");
                Delivery::Failed(e.to_string())
            }
        };

        let next = decision.next_state(today);
        self.store
            .save(&next)
            .await
            .map_err(OrchestratorError::StateSave)?;

        Ok(Outcome {
            previous,
            resolution,
            decision,
            delivery,
            saved: true,
        })
    }

    fn load_state(&self, today: chrono::NaiveDate) -> PersistedState {
        let result = self.store.load();
        match &result {
            LoadResult::Loaded(state) => tracing::debug!("Previous state: {state}"),
            LoadResult::NotFound => tracing::debug!("No previous state found, starting fresh"),
            LoadResult::Corrupted { reason, .. } => {
                tracing::warn!("State file unusable ({reason}), starting from a zero counter");
            }
        }
        result.into_state(today)
    }
}

fn log_conditions(
    previous: &PersistedState,
    decision: &NotificationDecision,
    today: chrono::NaiveDate,
) {
    let reasons = decision
        .reasons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    tracing::info!("Notification conditions: {reasons}");

    if previous.last_notified_date != today {
        tracing::info!("Last sent (UTC): {}", format_date(previous.last_notified_date));
        tracing::info!("Today     (UTC): {}", format_date(today));
    }

    if decision.address_changed() {
        tracing::info!(
            "IP Addresses: '{}' -> '{}'",
            or_none(&previous.ip_address),
            or_none(&decision.address),
        );
    }

    if decision.updated_counter != previous.notifications_sent_today
        || decision.address_changed()
    {
        tracing::info!(
            "Notification number {} for today, {} (UTC)",
            decision.updated_counter,
            format_date(today)
        );
    }
}

fn or_none(address: &str) -> &str {
    if address.is_empty() {
        "None"
    } else {
        address
    }
}
