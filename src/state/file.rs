//! File-based state persistence implementation.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::time::{Clock, SystemClock, utc_date};

use super::{LoadResult, PersistedState, StateError, StateStore};

/// File-based implementation of [`StateStore`].
///
/// Stores `"{address},{counter}"` as plain text. The file's modification
/// time, truncated to the UTC day, is read back as the last notified date,
/// so copying or touching the file changes that date.
///
/// # Atomic Writes
///
/// Uses write-to-temp-then-rename pattern to prevent corruption:
/// 1. Write to `{path}.tmp`
/// 2. Rename `{path}.tmp` to `{path}`
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Creates a new file-based state store at the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the state file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Performs the blocking save operation.
    ///
    /// Separated out so it can be wrapped in `spawn_blocking`.
    fn save_blocking(path: &Path, content: &str) -> Result<(), StateError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(StateError::Write)?;
            }
        }

        // Append .tmp instead of replacing the extension
        // (last_ip_address.txt -> last_ip_address.txt.tmp)
        let temp_path = PathBuf::from(format!("{}.tmp", path.display()));

        std::fs::write(&temp_path, content).map_err(StateError::Write)?;
        std::fs::rename(&temp_path, path).map_err(StateError::Write)?;

        Ok(())
    }
}

/// Parses `"{address},{counter}"`.
///
/// A record without a separator is rejected. The counter takes the leading
/// decimal digits of its field and falls back to 0 when there are none.
fn parse_record(content: &str) -> Result<(String, u32), String> {
    let (address, counter) = content
        .split_once(',')
        .ok_or_else(|| "missing ',' separator".to_string())?;

    let counter = counter.trim_start();
    let digits_len = counter
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(counter.len());
    let digits = &counter[..digits_len];

    let count = if digits.is_empty() {
        0
    } else {
        digits.parse::<u32>().unwrap_or(u32::MAX)
    };

    Ok((address.trim().to_string(), count))
}

/// Turns the file content and its modification day into a [`LoadResult`].
///
/// A well-formed record is kept even when the modification day is unknown;
/// it is then dated `today`.
fn interpret_record(
    content: &str,
    last_modified: Option<NaiveDate>,
    today: NaiveDate,
) -> LoadResult {
    match parse_record(content) {
        Ok((address, count)) => {
            let date = last_modified.unwrap_or_else(|| {
                tracing::warn!("State file modification time unavailable, assuming today");
                today
            });
            LoadResult::Loaded(PersistedState::new(address, count, date))
        }
        Err(reason) => LoadResult::Corrupted {
            reason: format!("Malformed record: {reason}"),
            last_modified,
        },
    }
}

fn modified_date(metadata: &std::fs::Metadata) -> Option<NaiveDate> {
    metadata.modified().ok().map(utc_date)
}

impl StateStore for FileStateStore {
    fn load(&self) -> LoadResult {
        let metadata = match std::fs::metadata(&self.path) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => return LoadResult::NotFound,
            Err(e) => {
                return LoadResult::Corrupted {
                    reason: format!("Failed to stat file: {e}"),
                    last_modified: None,
                };
            }
        };
        let last_modified = modified_date(&metadata);

        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                return LoadResult::Corrupted {
                    reason: format!("Failed to read file: {e}"),
                    last_modified,
                };
            }
        };

        interpret_record(&content, last_modified, SystemClock.today())
    }

    async fn save(&self, state: &PersistedState) -> Result<(), StateError> {
        let path = self.path.clone();
        let content = state.to_record();

        tokio::task::spawn_blocking(move || Self::save_blocking(&path, &content))
            .await
            .map_err(StateError::Interrupted)?
    }
}
