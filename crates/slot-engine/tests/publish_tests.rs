//! Tests for clock-dependent publish and slot-visibility decisions.

use chrono::{DateTime, TimeZone, Utc};
use slot_engine::publish::{
    is_past, resolve_publish_time, upcoming, Clock, FixedClock, PublishTiming, SystemClock,
};
use slot_engine::{SlotDraft, WallClockMoment};

fn at(h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 16, h, 0, 0).unwrap()
}

// ── resolve_publish_time ────────────────────────────────────────────────────

#[test]
fn past_publish_time_publishes_immediately() {
    let clock = FixedClock(at(12));
    let moment = WallClockMoment::new("2026-03-16", "07:30");

    // 07:30 EDT = 11:30 UTC, before the clock.
    assert_eq!(
        resolve_publish_time(&moment, "America/New_York", &clock).unwrap(),
        PublishTiming::Immediate
    );
}

#[test]
fn future_publish_time_is_scheduled() {
    let clock = FixedClock(at(12));
    let moment = WallClockMoment::new("2026-03-16", "09:00");

    assert_eq!(
        resolve_publish_time(&moment, "America/New_York", &clock).unwrap(),
        PublishTiming::At(at(13))
    );
}

#[test]
fn now_counts_as_past() {
    let now = at(12);
    assert!(is_past(&now, &FixedClock(now)));
}

#[test]
fn upcoming_drops_started_slots() {
    let clock = FixedClock(at(12));
    let slots = vec![
        SlotDraft::new(at(11), at(13)),
        SlotDraft::new(at(12), at(13)),
        SlotDraft::new(at(14), at(15)),
    ];

    assert_eq!(upcoming(&slots, &clock), vec![SlotDraft::new(at(14), at(15))]);
}

#[test]
fn malformed_publish_moment_is_reported() {
    let clock = FixedClock(at(12));
    let moment = WallClockMoment::new("2026-03-16", "9am");

    assert!(resolve_publish_time(&moment, "UTC", &clock)
        .unwrap_err()
        .is_parse_error());
}

#[test]
fn system_clock_reads_current_time() {
    let before = Utc::now();
    let now = SystemClock.now();
    assert!(now >= before);
    assert!(!is_past(&(now + chrono::Duration::hours(1)), &SystemClock));
}

// ── Serialization ───────────────────────────────────────────────────────────

#[test]
fn publish_timing_serializes_with_kind_tag() {
    assert_eq!(
        serde_json::to_value(PublishTiming::Immediate).unwrap(),
        serde_json::json!({"kind": "immediate"})
    );
    assert_eq!(
        serde_json::to_value(PublishTiming::At(at(13))).unwrap(),
        serde_json::json!({"kind": "at", "at": "2026-03-16T13:00:00Z"})
    );
}
