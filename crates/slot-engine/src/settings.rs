//! Scheduling settings supplied by the site configuration.
//!
//! Settings are passed explicitly to every operation that needs them. They
//! deserialize from the camelCase JSON the admin panel stores; every field has
//! a default so partial documents are accepted.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::clock_time::{format_date, parse_date, parse_hhmm, MINUTES_PER_DAY};
use crate::converter::MonthAvailability;
use crate::day_slots::{auto_generate, generate_candidates, DaySlotRule, SlotWindow};
use crate::error::{Result, SlotError};
use crate::timezone::parse_zone;

/// Longest range `availability_for_range` will fill.
pub const MAX_RANGE_DAYS: i64 = 366;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulingSettings {
    pub work_hours_start: String,
    pub work_hours_end: String,
    pub default_slot_duration_minutes: u32,
    pub default_slot_interval_minutes: u32,
    pub site_timezone: String,
    /// Weekdays that are available unless the calendar says otherwise.
    pub available_days: Vec<Weekday>,
    pub scheduling_availability: MonthAvailability,
}

impl Default for SchedulingSettings {
    fn default() -> Self {
        Self {
            work_hours_start: "09:00".to_string(),
            work_hours_end: "17:00".to_string(),
            default_slot_duration_minutes: 60,
            default_slot_interval_minutes: 60,
            site_timezone: "UTC".to_string(),
            available_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            scheduling_availability: MonthAvailability::new(),
        }
    }
}

impl SchedulingSettings {
    /// Parse and validate settings JSON.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidSettings` for malformed JSON or values that
    /// fail [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| SlotError::InvalidSettings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check work hours and slot lengths.
    ///
    /// An unknown `site_timezone` is only logged: conversions fall back to the
    /// system-local zone rather than failing.
    pub fn validate(&self) -> Result<()> {
        let start = parse_hhmm(&self.work_hours_start)
            .map_err(|e| SlotError::InvalidSettings(format!("workHoursStart: {e}")))?;
        let end = parse_hhmm(&self.work_hours_end)
            .map_err(|e| SlotError::InvalidSettings(format!("workHoursEnd: {e}")))?;
        if start >= end {
            return Err(SlotError::InvalidSettings(format!(
                "work hours must start before they end ({} >= {})",
                self.work_hours_start, self.work_hours_end
            )));
        }
        if self.default_slot_duration_minutes == 0 {
            return Err(SlotError::InvalidSettings(
                "defaultSlotDurationMinutes must be positive".to_string(),
            ));
        }
        if self.default_slot_interval_minutes == 0 {
            return Err(SlotError::InvalidSettings(
                "defaultSlotIntervalMinutes must be positive".to_string(),
            ));
        }
        if self.default_slot_duration_minutes > MINUTES_PER_DAY {
            return Err(SlotError::InvalidSettings(format!(
                "defaultSlotDurationMinutes must not exceed {MINUTES_PER_DAY}"
            )));
        }
        if self.default_slot_interval_minutes > MINUTES_PER_DAY {
            return Err(SlotError::InvalidSettings(format!(
                "defaultSlotIntervalMinutes must not exceed {MINUTES_PER_DAY}"
            )));
        }
        if parse_zone(&self.site_timezone).is_err() {
            warn!(
                timezone = self.site_timezone.as_str(),
                "siteTimezone is not a known IANA zone; system local time will be used"
            );
        }
        Ok(())
    }

    /// Candidate slots for a rule under these work hours.
    pub fn candidates(&self, rule: &DaySlotRule) -> Result<Vec<SlotWindow>> {
        generate_candidates(
            rule,
            self.default_slot_duration_minutes,
            &self.work_hours_start,
            &self.work_hours_end,
            self.default_slot_interval_minutes,
        )
    }

    /// Candidate slots for a `"YYYY-MM-DD"` date, using the calendar entry if
    /// there is one and the weekday default otherwise.
    pub fn candidates_for(&self, date: &str) -> Result<Vec<SlotWindow>> {
        let day = parse_date(date)?;
        match self.scheduling_availability.get(date) {
            Some(rule) => self.candidates(rule),
            None => self.candidates(&self.default_rule(day)?),
        }
    }

    /// The rule a date gets when the calendar has no entry for it.
    pub fn default_rule(&self, date: NaiveDate) -> Result<DaySlotRule> {
        if !self.available_days.contains(&date.weekday()) {
            return Ok(DaySlotRule::unavailable());
        }
        Ok(DaySlotRule {
            available: true,
            auto_generated_slots: auto_generate(
                &self.work_hours_start,
                &self.work_hours_end,
                self.default_slot_duration_minutes,
                self.default_slot_interval_minutes,
            )?,
            ..DaySlotRule::default()
        })
    }

    /// Availability for every date in `[from, to]`. Calendar entries win over
    /// the weekday defaults.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidDate` for malformed bounds and
    /// `SlotError::InvalidSettings` if `to` precedes `from` or the range is
    /// longer than [`MAX_RANGE_DAYS`].
    pub fn availability_for_range(&self, from: &str, to: &str) -> Result<MonthAvailability> {
        let first = parse_date(from)?;
        let last = parse_date(to)?;
        if last < first {
            return Err(SlotError::InvalidSettings(format!(
                "range ends before it starts ({from} > {to})"
            )));
        }
        if (last - first).num_days() >= MAX_RANGE_DAYS {
            return Err(SlotError::InvalidSettings(format!(
                "range longer than {MAX_RANGE_DAYS} days"
            )));
        }

        let mut availability = MonthAvailability::new();
        for day in first.iter_days().take_while(|d| *d <= last) {
            let key = format_date(day);
            let rule = match self.scheduling_availability.get(&key) {
                Some(rule) => rule.clone(),
                None => self.default_rule(day)?,
            };
            availability.insert(key, rule);
        }
        Ok(availability)
    }
}
