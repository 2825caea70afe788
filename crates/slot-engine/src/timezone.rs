//! Conversion between wall-clock moments in a named IANA zone and UTC instants.
//!
//! Resolution goes through `chrono-tz`, so sub-hour offsets (Asia/Kathmandu,
//! Australia/Adelaide) and readings that cross midnight in UTC need no special
//! casing. An unknown zone name does not fail: the system-local zone is used
//! instead and a warning is logged.

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock_time;
use crate::dst::{self, Resolution};
use crate::error::{Result, SlotError};

/// A calendar date and clock time with no zone attached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WallClockMoment {
    /// `"YYYY-MM-DD"`
    pub date: String,
    /// `"HH:mm"`
    pub time: String,
}

impl WallClockMoment {
    pub fn new(date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
        }
    }

    /// Parse both fields into a naive local datetime.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidDate` or `SlotError::InvalidTime` for
    /// malformed fields.
    pub fn to_naive(&self) -> Result<NaiveDateTime> {
        let date = clock_time::parse_date(&self.date)?;
        let time = clock_time::parse_time(&self.time)?;
        Ok(date.and_time(time))
    }

    pub fn from_naive(local: NaiveDateTime) -> Self {
        Self {
            date: clock_time::format_date(local.date()),
            time: clock_time::format_time(local.time()),
        }
    }
}

/// The zone a set of slots is expressed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Zone {
    Named(Tz),
    /// Fallback for names `chrono-tz` does not know.
    SystemLocal,
}

impl Zone {
    /// Resolve a zone name, falling back to the system-local zone.
    pub fn resolve(name: &str) -> Self {
        match parse_zone(name) {
            Ok(tz) => Zone::Named(tz),
            Err(_) => {
                warn!(timezone = name, "unknown timezone, falling back to system local time");
                Zone::SystemLocal
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Zone::Named(tz) => tz.name(),
            Zone::SystemLocal => "local",
        }
    }

    /// Map a local reading in this zone to a UTC instant.
    pub fn to_utc(&self, local: &NaiveDateTime) -> DateTime<Utc> {
        let (instant, resolution) = match self {
            Zone::Named(tz) => dst::resolve_local(tz, local),
            Zone::SystemLocal => dst::resolve_local(&Local, local),
        };
        if resolution != Resolution::Exact {
            debug!(
                timezone = self.name(),
                local = %local,
                utc = %instant,
                ?resolution,
                "local time falls in a DST transition"
            );
        }
        instant
    }

    /// Read a UTC instant on this zone's wall clock.
    pub fn to_local(&self, instant: &DateTime<Utc>) -> NaiveDateTime {
        match self {
            Zone::Named(tz) => instant.with_timezone(tz).naive_local(),
            Zone::SystemLocal => instant.with_timezone(&Local).naive_local(),
        }
    }
}

/// Strictly parse an IANA zone name.
///
/// # Errors
/// Returns `SlotError::InvalidTimezone` if the name is not in the tz database.
pub fn parse_zone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| SlotError::InvalidTimezone(name.to_string()))
}

/// Convert a wall-clock moment in `timezone` to a UTC instant.
///
/// Readings inside a DST gap are shifted forward; readings inside a DST
/// overlap take the earlier instant (see [`dst::resolve_local`]).
///
/// # Errors
/// Returns `SlotError::InvalidDate` / `SlotError::InvalidTime` if the moment is
/// malformed. Never fails because of the zone name.
pub fn to_instant(moment: &WallClockMoment, timezone: &str) -> Result<DateTime<Utc>> {
    let local = moment.to_naive()?;
    Ok(Zone::resolve(timezone).to_utc(&local))
}

/// Read a UTC instant on the wall clock of `timezone`.
pub fn to_wall_clock(instant: &DateTime<Utc>, timezone: &str) -> WallClockMoment {
    WallClockMoment::from_naive(Zone::resolve(timezone).to_local(instant))
}
