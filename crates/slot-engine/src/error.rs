//! Error types for slot-engine operations.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SlotError {
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid time '{0}': expected HH:mm")]
    InvalidTime(String),

    /// Compilation produced nothing to offer. The message is shown to the
    /// operator as-is.
    #[error("Select at least one day and one time slot")]
    NoSlots,

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures reported by a [`SlotStore`](crate::store::SlotStore) backend.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("slot not found: {0}")]
    NotFound(String),

    /// The record is booked and must be cancelled before it can be removed.
    #[error("slot {0} is booked and cannot be removed")]
    Booked(String),

    #[error("slot store backend error: {0}")]
    Backend(String),
}

impl SlotError {
    /// True for malformed date or time input.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, SlotError::InvalidDate(_) | SlotError::InvalidTime(_))
    }
}

pub type Result<T> = std::result::Result<T, SlotError>;
