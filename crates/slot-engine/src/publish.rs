//! Clock-dependent decisions: is a computed instant already in the past?
//!
//! The clock is an explicit argument so these decisions are testable without
//! touching the system time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::converter::SlotDraft;
use crate::error::Result;
use crate::timezone::{to_instant, WallClockMoment};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// When scheduled content should go live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "at", rename_all = "camelCase")]
pub enum PublishTiming {
    /// The requested time has passed (or is now); publish right away.
    Immediate,
    At(DateTime<Utc>),
}

pub fn is_past(instant: &DateTime<Utc>, clock: &dyn Clock) -> bool {
    *instant <= clock.now()
}

/// Resolve a scheduled publish time given on the wall clock of `timezone`.
///
/// # Errors
/// Returns `SlotError::InvalidDate` / `SlotError::InvalidTime` for a malformed
/// moment.
pub fn resolve_publish_time(
    moment: &WallClockMoment,
    timezone: &str,
    clock: &dyn Clock,
) -> Result<PublishTiming> {
    let instant = to_instant(moment, timezone)?;
    if is_past(&instant, clock) {
        Ok(PublishTiming::Immediate)
    } else {
        Ok(PublishTiming::At(instant))
    }
}

/// Slots that have not started yet.
pub fn upcoming(slots: &[SlotDraft], clock: &dyn Clock) -> Vec<SlotDraft> {
    let now = clock.now();
    slots.iter().filter(|s| s.start > now).copied().collect()
}
