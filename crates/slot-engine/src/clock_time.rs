//! `"HH:mm"` and `"YYYY-MM-DD"` string handling.
//!
//! Availability data is exchanged as plain strings. These helpers are the only
//! place that parses or formats them, so every module agrees on the format.

use chrono::{NaiveDate, NaiveTime, Timelike};

use crate::error::{Result, SlotError};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Parse an `"HH:mm"` string into minutes since midnight.
pub fn parse_hhmm(s: &str) -> Result<u32> {
    parse_time(s).map(|t| t.hour() * 60 + t.minute())
}

/// Parse an `"HH:mm"` string into a [`NaiveTime`].
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
        .map_err(|_| SlotError::InvalidTime(s.to_string()))
}

/// Parse a `"YYYY-MM-DD"` string.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| SlotError::InvalidDate(s.to_string()))
}

/// Format minutes since midnight as `"HH:mm"`. Values past midnight wrap.
pub fn format_hhmm(minutes: u32) -> String {
    let minutes = minutes % MINUTES_PER_DAY;
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
