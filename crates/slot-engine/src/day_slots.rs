//! Candidate slot generation for a single calendar day.
//!
//! A day's candidates are its auto-generated slots (stored on the rule, or
//! walked out of the work-hour window) minus the start times the operator
//! excluded, followed by any one-off slots added by hand.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::clock_time::{format_hhmm, parse_hhmm, MINUTES_PER_DAY};
use crate::error::{Result, SlotError};

/// A start/end pair of `"HH:mm"` clock times on some day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotWindow {
    pub start: String,
    pub end: String,
}

impl SlotWindow {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// One day's availability pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySlotRule {
    #[serde(default)]
    pub available: bool,
    /// Precomputed work-hour slots. Empty means "derive from work hours".
    #[serde(default)]
    pub auto_generated_slots: Vec<SlotWindow>,
    /// Start times removed from the auto-generated set.
    #[serde(default)]
    pub excluded_slots: BTreeSet<String>,
    /// Hand-added slots, flattened as `start, end, start, end, ...`.
    /// A trailing start without an end is ignored.
    #[serde(default)]
    pub specific_slots: Vec<String>,
}

impl DaySlotRule {
    pub fn available() -> Self {
        Self {
            available: true,
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self::default()
    }

    /// An available day that offers only the given hand-added slot.
    pub fn with_specific_slot(start: impl Into<String>, end: impl Into<String>) -> Self {
        let mut rule = Self::available();
        rule.push_specific_slot(start, end);
        rule
    }

    pub fn push_specific_slot(&mut self, start: impl Into<String>, end: impl Into<String>) {
        self.specific_slots.push(start.into());
        self.specific_slots.push(end.into());
    }

    /// Decode `specific_slots` into windows.
    pub fn specific_windows(&self) -> Vec<SlotWindow> {
        self.specific_slots
            .chunks_exact(2)
            .map(|pair| SlotWindow::new(pair[0].clone(), pair[1].clone()))
            .collect()
    }
}

/// Walk the work-hour window in `step_minutes` increments, emitting a
/// `duration_minutes` slot at each step that still ends by `work_end`.
///
/// # Errors
/// Returns `SlotError::InvalidTime` if either bound is malformed and
/// `SlotError::InvalidSettings` if the duration or step is zero or longer
/// than a day.
pub fn auto_generate(
    work_start: &str,
    work_end: &str,
    duration_minutes: u32,
    step_minutes: u32,
) -> Result<Vec<SlotWindow>> {
    if duration_minutes == 0 {
        return Err(SlotError::InvalidSettings(
            "slot duration must be positive".to_string(),
        ));
    }
    if step_minutes == 0 {
        return Err(SlotError::InvalidSettings(
            "slot interval must be positive".to_string(),
        ));
    }
    if duration_minutes > MINUTES_PER_DAY || step_minutes > MINUTES_PER_DAY {
        return Err(SlotError::InvalidSettings(format!(
            "slot duration and interval must not exceed {MINUTES_PER_DAY} minutes"
        )));
    }

    let start = parse_hhmm(work_start)?;
    let end = parse_hhmm(work_end)?;

    let mut slots = Vec::new();
    let mut cursor = start;
    while let Some(slot_end) = cursor.checked_add(duration_minutes) {
        if slot_end > end {
            break;
        }
        slots.push(SlotWindow::new(format_hhmm(cursor), format_hhmm(slot_end)));
        match cursor.checked_add(step_minutes) {
            Some(next) => cursor = next,
            None => break,
        }
    }

    Ok(slots)
}

/// Produce the ordered candidate slots for one day.
///
/// Unavailable days yield nothing. Otherwise: auto-generated slots minus
/// exclusions, then the hand-added slots. Hand-added slots may duplicate an
/// auto-generated start; the duplicate collapses once enabled, since
/// selections are keyed by start time.
///
/// # Errors
/// Same as [`auto_generate`], and only when the rule has no stored
/// auto-generated slots.
pub fn generate_candidates(
    rule: &DaySlotRule,
    duration_minutes: u32,
    work_start: &str,
    work_end: &str,
    step_minutes: u32,
) -> Result<Vec<SlotWindow>> {
    if !rule.available {
        return Ok(Vec::new());
    }

    let base = if rule.auto_generated_slots.is_empty() {
        auto_generate(work_start, work_end, duration_minutes, step_minutes)?
    } else {
        rule.auto_generated_slots.clone()
    };

    let mut candidates: Vec<SlotWindow> = base
        .into_iter()
        .filter(|slot| !rule.excluded_slots.contains(&slot.start))
        .collect();
    candidates.extend(rule.specific_windows());

    Ok(candidates)
}
