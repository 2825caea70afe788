//! Availability ↔ slot conversion.
//!
//! [`compile`] turns the operator's availability calendar plus the per-request
//! selection of enabled start times into concrete UTC slot intervals.
//! [`decompile`] goes the other way, so an existing request can be reopened in
//! the editor with its persisted slots pre-selected. Compiling the output of
//! `decompile` yields the same set of intervals that produced it.
//!
//! Both maps are `BTreeMap`s keyed by `"YYYY-MM-DD"`, so iteration (and with it
//! the order of compiled slots) is chronological by date, then by start time.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock_time::{format_date, format_time, parse_date, parse_time};
use crate::day_slots::DaySlotRule;
use crate::error::{Result, SlotError};
use crate::settings::SchedulingSettings;
use crate::timezone::Zone;

/// The operator's availability calendar, keyed by `"YYYY-MM-DD"`.
pub type MonthAvailability = BTreeMap<String, DaySlotRule>;

/// Start times (`"HH:mm"`) offered for one request, keyed by `"YYYY-MM-DD"`.
pub type EnabledSlotSelection = BTreeMap<String, BTreeSet<String>>;

/// An uncommitted slot interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotDraft {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SlotDraft {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// What the slot editor works with: the days on offer and the times enabled
/// on each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSelection {
    #[serde(default)]
    pub availability: MonthAvailability,
    #[serde(default)]
    pub enabled: EnabledSlotSelection,
}

/// Compile enabled start times on available days into slot intervals.
///
/// Each slot ends `duration_minutes` later on the wall clock of `timezone`. An
/// end past midnight rolls into the next day. If DST makes the wall-clock end
/// resolve at or before the start, the end is `start + duration_minutes`.
/// Starts that resolve to an already compiled interval are dropped, keeping
/// the first.
///
/// # Errors
/// - `SlotError::NoSlots` if nothing was selected on an available day.
/// - `SlotError::InvalidDate` / `SlotError::InvalidTime` for malformed keys or
///   start times.
/// - `SlotError::InvalidSettings` if `duration_minutes` is zero.
pub fn compile(
    availability: &MonthAvailability,
    enabled: &EnabledSlotSelection,
    duration_minutes: u32,
    timezone: &str,
) -> Result<Vec<SlotDraft>> {
    if duration_minutes == 0 {
        return Err(SlotError::InvalidSettings(
            "slot duration must be positive".to_string(),
        ));
    }

    let zone = Zone::resolve(timezone);
    let duration = Duration::minutes(i64::from(duration_minutes));
    let mut drafts = Vec::new();
    let mut seen = HashSet::new();

    for (date, rule) in availability {
        if !rule.available {
            continue;
        }
        let Some(times) = enabled.get(date) else {
            continue;
        };
        for time in times {
            let draft = draft_for(&zone, date, time, duration)?;
            // Distinct starts in a DST gap can land on the same instant.
            if !seen.insert(draft) {
                debug!(date = date.as_str(), time = time.as_str(), "start collapses onto an earlier slot");
                continue;
            }
            drafts.push(draft);
        }
    }

    if drafts.is_empty() {
        return Err(SlotError::NoSlots);
    }
    Ok(drafts)
}

fn draft_for(zone: &Zone, date: &str, time: &str, duration: Duration) -> Result<SlotDraft> {
    let local_start: NaiveDateTime = parse_date(date)?.and_time(parse_time(time)?);
    let start = zone.to_utc(&local_start);
    let mut end = zone.to_utc(&(local_start + duration));
    if end <= start {
        end = start + duration;
    }
    let draft = SlotDraft { start, end };
    if draft.duration_minutes() != duration.num_minutes() {
        debug!(
            date,
            time,
            minutes = draft.duration_minutes(),
            "slot length changed by a DST transition"
        );
    }
    Ok(draft)
}

/// Rebuild an editable selection from existing slot intervals.
///
/// Every slot's date (on the wall clock of `timezone`) is marked available and
/// its start time enabled. Dates present in `reference` keep a copy of their
/// rule so the editor can show the full candidate set. Dates missing from it
/// get a rule carrying only the hand-added slots found on that date.
pub fn decompile(
    slots: &[SlotDraft],
    reference: &MonthAvailability,
    timezone: &str,
) -> SlotSelection {
    let zone = Zone::resolve(timezone);
    let mut selection = SlotSelection::default();

    for slot in slots {
        let local_start = zone.to_local(&slot.start);
        let local_end = zone.to_local(&slot.end);
        let date = format_date(local_start.date());
        let start = format_time(local_start.time());

        match reference.get(&date) {
            Some(rule) => {
                selection
                    .availability
                    .entry(date.clone())
                    .or_insert_with(|| DaySlotRule {
                        available: true,
                        ..rule.clone()
                    });
            }
            None => {
                selection
                    .availability
                    .entry(date.clone())
                    .or_insert_with(DaySlotRule::available)
                    .push_specific_slot(start.clone(), format_time(local_end.time()));
            }
        }

        selection.enabled.entry(date).or_default().insert(start);
    }

    selection
}

/// Enable every candidate of every available day.
///
/// # Errors
/// Propagates candidate generation errors for malformed work hours.
pub fn enable_all(
    availability: &MonthAvailability,
    settings: &SchedulingSettings,
) -> Result<EnabledSlotSelection> {
    let mut enabled = EnabledSlotSelection::new();
    for (date, rule) in availability {
        let starts: BTreeSet<String> = settings
            .candidates(rule)?
            .into_iter()
            .map(|slot| slot.start)
            .collect();
        if !starts.is_empty() {
            enabled.insert(date.clone(), starts);
        }
    }
    Ok(enabled)
}

