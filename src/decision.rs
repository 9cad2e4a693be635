//! Notification throttling policy.
//!
//! A notification goes out when the address changed, when nothing has been
//! sent yet today, or while fewer than [`BURST_LIMIT`] notifications have been
//! sent for the current address. The counter only grows on the first and
//! last of these; a notification sent only because the day rolled over
//! leaves it untouched.

use std::fmt;

use chrono::NaiveDate;

use crate::state::PersistedState;

#[cfg(test)]
#[path = "decision_tests.rs"]
mod tests;

/// Notifications sent for one address before throttling to one per day.
pub const BURST_LIMIT: u32 = 10;

/// Why a notification is due. Several can hold at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyReason {
    /// The resolved address differs from the stored one.
    AddressChanged,
    /// Nothing was sent yet on the current UTC day.
    NewDay,
    /// Fewer than [`BURST_LIMIT`] notifications were sent for this address.
    BurstNotExhausted,
}

impl fmt::Display for NotifyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddressChanged => write!(f, "address changed"),
            Self::NewDay => write!(f, "new day"),
            Self::BurstNotExhausted => write!(f, "burst not exhausted"),
        }
    }
}

/// Outcome of applying the policy to one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDecision {
    /// Whether a notification must be sent.
    pub should_notify: bool,
    /// The single line to send.
    pub message: String,
    /// Counter to persist after this invocation.
    pub updated_counter: u32,
    /// Conditions that triggered the notification (empty if none).
    pub reasons: Vec<NotifyReason>,
    /// Address to persist; empty when the address could not be resolved.
    pub address: String,
}

impl NotificationDecision {
    /// Returns true if the resolved address differs from the stored one.
    #[must_use]
    pub fn address_changed(&self) -> bool {
        self.reasons.contains(&NotifyReason::AddressChanged)
    }

    /// Builds the state to persist after a notification sent on `today`.
    #[must_use]
    pub fn next_state(&self, today: NaiveDate) -> PersistedState {
        PersistedState::new(self.address.clone(), self.updated_counter, today)
    }
}

/// Renders the notification body for a resolved address.
#[must_use]
pub fn address_message(address: &str) -> String {
    format!("IP address is '{address}'")
}

/// Decides whether to notify and what counter to keep.
///
/// `new_address` is `None` when the echo services reached no consensus; an
/// unknown address never equals a stored one, the empty string included.
/// `diagnostic`, when present, replaces the default message.
#[must_use]
pub fn decide(
    old_address: &str,
    old_counter: u32,
    last_notified_date: NaiveDate,
    today: NaiveDate,
    new_address: Option<&str>,
    diagnostic: Option<&str>,
) -> NotificationDecision {
    let address_changed = new_address != Some(old_address);
    let new_day = today != last_notified_date;
    let burst_open = old_counter < BURST_LIMIT;

    let reasons: Vec<NotifyReason> = [
        (address_changed, NotifyReason::AddressChanged),
        (new_day, NotifyReason::NewDay),
        (burst_open, NotifyReason::BurstNotExhausted),
    ]
    .into_iter()
    .filter_map(|(holds, reason)| holds.then_some(reason))
    .collect();

    let should_notify = !reasons.is_empty();

    let updated_counter = if !should_notify {
        old_counter
    } else if address_changed {
        1
    } else if burst_open {
        old_counter + 1
    } else {
        old_counter
    };

    let address = new_address.unwrap_or_default().to_string();
    let message = diagnostic.map_or_else(|| address_message(&address), ToString::to_string);

    NotificationDecision {
        should_notify,
        message,
        updated_counter,
        reasons,
        address,
    }
}
