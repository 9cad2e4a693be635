//! Application execution logic.
//!
//! This module builds the production collaborators from the validated
//! configuration and runs the pipeline once.

use thiserror::Error;

use ipnotify::config::ValidatedConfig;
use ipnotify::echo::{ClientBuildError, HttpEchoFetcher, IpResolver, OrderedSelector, ReqwestClient};
use ipnotify::notify::{NotifyError, SmtpNotifier};
use ipnotify::orchestrator::{Orchestrator, OrchestratorError, Outcome};
use ipnotify::state::FileStateStore;

/// Type alias for the application's echo fetcher.
type AppFetcher = HttpEchoFetcher<ReqwestClient>;

/// Type alias for the fully wired production pipeline.
type AppOrchestrator = Orchestrator<FileStateStore, AppFetcher, SmtpNotifier>;

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to create the HTTP client for the echo services.
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[source] ClientBuildError),

    /// Failed to set up the SMTP transport.
    #[error("Failed to create notifier: {0}")]
    Notifier(#[source] NotifyError),

    /// The pipeline could not persist its state.
    #[error(transparent)]
    Pipeline(#[from] OrchestratorError),
}

/// Runs one invocation.
///
/// # Errors
///
/// Returns an error if:
/// - The HTTP client or SMTP transport cannot be created
/// - The state file cannot be written after a notification was decided
///
/// A failed notification is not an error; it is reported in the returned
/// [`Outcome`].
pub async fn execute(config: ValidatedConfig) -> Result<Outcome, RunError> {
    let orchestrator = create_orchestrator(&config)?;

    if config.dry_run {
        tracing::info!("Dry-run mode enabled - no email is sent and no state is saved");
    }
    tracing::debug!("State file: {}", orchestrator.store().path().display());

    let outcome = orchestrator.run().await?;
    Ok(outcome)
}

/// Builds the pipeline from configuration.
fn create_orchestrator(config: &ValidatedConfig) -> Result<AppOrchestrator, RunError> {
    let resolver = create_resolver(config)?;
    let notifier = SmtpNotifier::new(&config.email).map_err(RunError::Notifier)?;
    let store = FileStateStore::new(&config.state_file);

    Ok(Orchestrator::new(store, resolver, notifier)
        .with_query_count(config.query_count)
        .with_dry_run(config.dry_run))
}

/// Creates the echo-service resolver from configuration.
fn create_resolver(config: &ValidatedConfig) -> Result<IpResolver<AppFetcher>, RunError> {
    let client = ReqwestClient::with_timeout(config.timeout).map_err(RunError::HttpClient)?;
    let resolver = IpResolver::new(HttpEchoFetcher::new(client), config.services.clone());

    if config.ordered {
        Ok(resolver.with_selector(OrderedSelector))
    } else {
        Ok(resolver)
    }
}
