//! Tests for settings parsing, validation and availability defaults.

use chrono::Weekday;
use slot_engine::day_slots::{DaySlotRule, SlotWindow};
use slot_engine::{SchedulingSettings, SlotError};

const SETTINGS_JSON: &str = r#"{
    "workHoursStart": "10:00",
    "workHoursEnd": "13:00",
    "defaultSlotDurationMinutes": 30,
    "defaultSlotIntervalMinutes": 60,
    "siteTimezone": "Europe/London",
    "availableDays": ["Mon", "wednesday"],
    "schedulingAvailability": {
        "2026-03-16": { "available": false },
        "2026-03-21": { "available": true, "specificSlots": ["11:00", "12:00"] }
    }
}"#;

// ── Parsing and validation ──────────────────────────────────────────────────

#[test]
fn parses_camel_case_settings() {
    let settings = SchedulingSettings::from_json(SETTINGS_JSON).unwrap();

    assert_eq!(settings.work_hours_start, "10:00");
    assert_eq!(settings.default_slot_duration_minutes, 30);
    assert_eq!(settings.site_timezone, "Europe/London");
    assert_eq!(settings.available_days, vec![Weekday::Mon, Weekday::Wed]);
    assert_eq!(settings.scheduling_availability.len(), 2);
}

#[test]
fn missing_fields_take_defaults() {
    let settings = SchedulingSettings::from_json("{}").unwrap();
    assert_eq!(settings, SchedulingSettings::default());
    assert_eq!(settings.work_hours_end, "17:00");
    assert_eq!(settings.available_days.len(), 5);
}

#[test]
fn inverted_work_hours_are_invalid() {
    let err = SchedulingSettings::from_json(
        r#"{"workHoursStart":"18:00","workHoursEnd":"09:00"}"#,
    )
    .unwrap_err();
    assert!(matches!(err, SlotError::InvalidSettings(_)));
}

#[test]
fn zero_interval_is_invalid() {
    let err = SchedulingSettings::from_json(r#"{"defaultSlotIntervalMinutes":0}"#).unwrap_err();
    assert!(err.to_string().contains("defaultSlotIntervalMinutes"));
}

#[test]
fn slot_lengths_longer_than_a_day_are_invalid() {
    for json in [
        r#"{"defaultSlotIntervalMinutes":4294967295}"#,
        r#"{"defaultSlotDurationMinutes":4294967295}"#,
        r#"{"defaultSlotDurationMinutes":1441}"#,
    ] {
        assert!(
            matches!(SchedulingSettings::from_json(json), Err(SlotError::InvalidSettings(_))),
            "{json}"
        );
    }
    assert!(SchedulingSettings::from_json(r#"{"defaultSlotIntervalMinutes":1440}"#).is_ok());
}

#[test]
fn malformed_json_is_invalid_settings() {
    assert!(matches!(
        SchedulingSettings::from_json("{not json"),
        Err(SlotError::InvalidSettings(_))
    ));
}

#[test]
fn unknown_timezone_only_warns() {
    let settings = SchedulingSettings::from_json(r#"{"siteTimezone":"Atlantis/Capital"}"#);
    assert!(settings.is_ok());
}

// ── Availability defaults ───────────────────────────────────────────────────

#[test]
fn range_uses_weekday_defaults_and_calendar_overrides() {
    let settings = SchedulingSettings::from_json(SETTINGS_JSON).unwrap();

    // 2026-03-16 is a Monday, 2026-03-22 a Sunday.
    let avail = settings
        .availability_for_range("2026-03-16", "2026-03-22")
        .unwrap();

    assert_eq!(avail.len(), 7);
    // Monday turned off in the calendar.
    assert!(!avail["2026-03-16"].available);
    // Tuesday not an available weekday.
    assert_eq!(avail["2026-03-17"], DaySlotRule::unavailable());
    // Wednesday gets the work-hour slots.
    assert_eq!(
        avail["2026-03-18"].auto_generated_slots,
        vec![
            SlotWindow::new("10:00", "10:30"),
            SlotWindow::new("11:00", "11:30"),
            SlotWindow::new("12:00", "12:30"),
        ]
    );
    // Saturday opened by hand.
    assert!(avail["2026-03-21"].available);
}

#[test]
fn candidates_for_date_follow_same_rules() {
    let settings = SchedulingSettings::from_json(SETTINGS_JSON).unwrap();

    assert!(settings.candidates_for("2026-03-16").unwrap().is_empty());
    assert_eq!(settings.candidates_for("2026-03-18").unwrap().len(), 3);
    assert_eq!(
        settings.candidates_for("2026-03-21").unwrap(),
        vec![
            SlotWindow::new("10:00", "10:30"),
            SlotWindow::new("11:00", "11:30"),
            SlotWindow::new("12:00", "12:30"),
            SlotWindow::new("11:00", "12:00"),
        ]
    );
    assert!(settings.candidates_for("someday").unwrap_err().is_parse_error());
}

#[test]
fn inverted_range_is_rejected() {
    let settings = SchedulingSettings::default();
    assert!(matches!(
        settings.availability_for_range("2026-03-20", "2026-03-16"),
        Err(SlotError::InvalidSettings(_))
    ));
}

#[test]
fn overlong_range_is_rejected() {
    let settings = SchedulingSettings::default();
    assert!(settings
        .availability_for_range("2026-01-01", "2027-06-01")
        .is_err());
    assert_eq!(
        settings
            .availability_for_range("2026-01-01", "2026-12-31")
            .unwrap()
            .len(),
        365
    );
}
