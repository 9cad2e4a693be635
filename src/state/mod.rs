//! Persistence of the last notified address between invocations.
//!
//! The record holds the last address and how many notifications were sent
//! for it; the day of the last notification is the record's own
//! modification date rather than a stored field.

mod file;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use file::FileStateStore;

use std::fmt;
use std::io;

use chrono::NaiveDate;
use thiserror::Error;

/// Last known address and notification bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedState {
    /// Last address notified, empty if it was unknown.
    pub ip_address: String,
    /// Notifications sent since the address last changed.
    pub notifications_sent_today: u32,
    /// UTC day on which the record was last written.
    pub last_notified_date: NaiveDate,
}

impl PersistedState {
    /// Creates a state value.
    #[must_use]
    pub fn new(
        ip_address: impl Into<String>,
        notifications_sent_today: u32,
        last_notified_date: NaiveDate,
    ) -> Self {
        Self {
            ip_address: ip_address.into(),
            notifications_sent_today,
            last_notified_date,
        }
    }

    /// State assumed when nothing usable was persisted.
    #[must_use]
    pub fn fresh(today: NaiveDate) -> Self {
        Self::new(String::new(), 0, today)
    }

    /// Returns the on-disk representation, `"{address},{counter}"`.
    #[must_use]
    pub fn to_record(&self) -> String {
        format!("{},{}", self.ip_address, self.notifications_sent_today)
    }
}

impl fmt::Display for PersistedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' ({} notification(s), last on {})",
            self.ip_address,
            self.notifications_sent_today,
            crate::time::format_date(self.last_notified_date)
        )
    }
}

/// Result of loading state from persistent storage.
///
/// Explicitly models all valid states to avoid ambiguity:
/// - Successfully loaded previous state
/// - No previous state exists (first run)
/// - State exists but is unreadable or malformed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadResult {
    /// Successfully loaded previously saved state.
    Loaded(PersistedState),

    /// No state file exists (first run or explicitly deleted).
    NotFound,

    /// State file exists but could not be read or parsed.
    Corrupted {
        /// Reason for corruption (for logging/debugging).
        reason: String,
        /// Modification day of the file, if it could be determined.
        last_modified: Option<NaiveDate>,
    },
}

impl LoadResult {
    /// Returns the state to work with for this invocation.
    ///
    /// `NotFound` yields a fresh state dated `today`. `Corrupted` yields an
    /// empty address and a zero counter, keeping the file's modification day
    /// when known.
    #[must_use]
    pub fn into_state(self, today: NaiveDate) -> PersistedState {
        match self {
            Self::Loaded(state) => state,
            Self::NotFound => PersistedState::fresh(today),
            Self::Corrupted { last_modified, .. } => {
                PersistedState::fresh(last_modified.unwrap_or(today))
            }
        }
    }

    /// Returns `true` if state was successfully loaded.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Errors that can occur during state persistence operations.
///
/// Only covers write-side errors; read-side issues are modeled
/// as [`LoadResult`] variants to allow graceful degradation.
#[derive(Debug, Error)]
pub enum StateError {
    /// Failed to write the state file.
    #[error("Failed to write state file: {0}")]
    Write(#[source] io::Error),

    /// The background write task did not complete.
    #[error("State write task failed: {0}")]
    Interrupted(#[source] tokio::task::JoinError),
}

/// Abstraction for persisting state between program runs.
///
/// Implementations should:
/// - Use atomic writes to prevent corruption from crashes
/// - Handle missing files gracefully (return `LoadResult::NotFound`)
/// - Degrade gracefully on read errors (return `LoadResult::Corrupted`)
pub trait StateStore: Send + Sync {
    /// Loads previously saved state.
    fn load(&self) -> LoadResult;

    /// Saves state for the next invocation.
    ///
    /// The write itself marks the day of the last notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be written.
    fn save(
        &self,
        state: &PersistedState,
    ) -> impl std::future::Future<Output = Result<(), StateError>> + Send;
}

/// Mock state store for testing.
///
/// Allows tests to inject specific load results and capture saved state.
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::RwLock;

    /// A mock implementation of [`StateStore`] for testing.
    #[derive(Debug)]
    pub struct MockStateStore {
        load_result: LoadResult,
        saved: RwLock<Vec<PersistedState>>,
        fail_writes: bool,
    }

    impl MockStateStore {
        fn with_result(load_result: LoadResult) -> Self {
            Self {
                load_result,
                saved: RwLock::new(Vec::new()),
                fail_writes: false,
            }
        }

        /// Creates a mock that returns `LoadResult::Loaded` with the given state.
        #[must_use]
        pub fn with_loaded(state: PersistedState) -> Self {
            Self::with_result(LoadResult::Loaded(state))
        }

        /// Creates a mock that returns `LoadResult::NotFound`.
        #[must_use]
        pub fn not_found() -> Self {
            Self::with_result(LoadResult::NotFound)
        }

        /// Makes every save fail with a write error.
        #[must_use]
        pub const fn failing_writes(mut self) -> Self {
            self.fail_writes = true;
            self
        }

        /// Returns every state saved so far.
        ///
        /// # Panics
        ///
        /// Panics if the internal lock is poisoned (only in test code).
        #[must_use]
        pub fn saved(&self) -> Vec<PersistedState> {
            self.saved.read().unwrap().clone()
        }
    }

    impl StateStore for MockStateStore {
        fn load(&self) -> LoadResult {
            self.load_result.clone()
        }

        async fn save(&self, state: &PersistedState) -> Result<(), StateError> {
            if self.fail_writes {
                return Err(StateError::Write(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "read-only",
                )));
            }
            self.saved.write().unwrap().push(state.clone());
            Ok(())
        }
    }
}
