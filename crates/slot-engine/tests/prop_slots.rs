//! Property-based tests for slot compilation and reconciliation using proptest.
//!
//! These check invariants that must hold for any selection, not just the
//! examples in the other test files.

use std::collections::{BTreeSet, HashSet};

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use slot_engine::converter::{compile, decompile, EnabledSlotSelection, MonthAvailability};
use slot_engine::day_slots::{generate_candidates, DaySlotRule, SlotWindow};
use slot_engine::reconciler::{reconcile, SlotRecord, SlotStatus};
use slot_engine::store::{apply_plan, InMemorySlotStore, SlotStore};
use slot_engine::timezone::{to_instant, to_wall_clock, WallClockMoment};
use slot_engine::SlotDraft;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_timezone() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("UTC".to_string()),
        Just("America/New_York".to_string()),
        Just("America/Los_Angeles".to_string()),
        Just("Europe/London".to_string()),
        Just("Asia/Tokyo".to_string()),
        Just("Asia/Kathmandu".to_string()),
        Just("Australia/Adelaide".to_string()),
    ]
}

/// A date in 2025-2027. Day is capped at 28 to avoid invalid month/day combos.
fn arb_date() -> impl Strategy<Value = String> {
    (2025u32..=2027, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| format!("{:04}-{:02}-{:02}", y, m, d))
}

/// A quarter-hour start between 06:00 and 20:00, clear of the early-morning
/// hours in which these zones change their clocks.
fn arb_start() -> impl Strategy<Value = String> {
    (6u32..=19, prop_oneof![Just(0u32), Just(15), Just(30), Just(45)])
        .prop_map(|(h, m)| format!("{:02}:{:02}", h, m))
}

fn arb_duration() -> impl Strategy<Value = u32> {
    15u32..=120
}

/// 1-4 dates, each with 1-5 enabled start times.
fn arb_selection() -> impl Strategy<Value = (MonthAvailability, EnabledSlotSelection)> {
    prop::collection::btree_map(arb_date(), prop::collection::btree_set(arb_start(), 1..=5), 1..=4)
        .prop_map(|enabled| {
            let availability: MonthAvailability = enabled
                .keys()
                .map(|date| (date.clone(), DaySlotRule::available()))
                .collect();
            (availability, enabled)
        })
}

fn arb_window() -> impl Strategy<Value = SlotWindow> {
    (arb_start(), arb_start()).prop_map(|(s, e)| SlotWindow::new(s, e))
}

fn arb_record() -> impl Strategy<Value = (u32, bool)> {
    (0u32..48, any::<bool>())
}

fn record(index: usize, (offset, is_booked): (u32, bool)) -> SlotRecord {
    let start = Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap()
        + Duration::minutes(i64::from(offset) * 30);
    let status = if is_booked {
        SlotStatus::Booked {
            booked_by_invite_id: format!("invite-{index}"),
        }
    } else {
        SlotStatus::Available
    };
    SlotRecord {
        id: format!("rec-{index}"),
        request_id: "req-1".to_string(),
        start,
        end: start + Duration::minutes(30),
        status,
    }
}

fn drafts(offsets: &[u32]) -> Vec<SlotDraft> {
    offsets
        .iter()
        .map(|o| {
            let start = Utc.with_ymd_and_hms(2026, 3, 17, 0, 0, 0).unwrap()
                + Duration::minutes(i64::from(*o) * 30);
            SlotDraft::new(start, start + Duration::minutes(30))
        })
        .collect()
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Property 1: decompile(compile(..)) recompiles to the same slot set
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn compile_decompile_round_trip(
        (availability, enabled) in arb_selection(),
        tz in arb_timezone(),
        dur in arb_duration(),
    ) {
        let original = compile(&availability, &enabled, dur, &tz).unwrap();
        let back = decompile(&original, &availability, &tz);
        let recompiled = compile(&back.availability, &back.enabled, dur, &tz).unwrap();

        let a: HashSet<SlotDraft> = original.into_iter().collect();
        let b: HashSet<SlotDraft> = recompiled.into_iter().collect();
        prop_assert_eq!(a, b);
        prop_assert_eq!(back.enabled, enabled);
    }
}

// ---------------------------------------------------------------------------
// Property 2: wall clock → instant → wall clock is the identity
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn wall_clock_round_trip(date in arb_date(), time in arb_start(), tz in arb_timezone()) {
        let moment = WallClockMoment::new(date, time);
        let instant = to_instant(&moment, &tz).unwrap();
        prop_assert_eq!(to_wall_clock(&instant, &tz), moment);
    }
}

// ---------------------------------------------------------------------------
// Property 3: booked records are never planned for deletion
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn booked_records_never_deleted(
        current in prop::collection::vec(arb_record(), 0..20),
        desired in prop::collection::vec(0u32..48, 0..20),
    ) {
        let current: Vec<SlotRecord> = current.into_iter().enumerate().map(|(i, r)| record(i, r)).collect();
        let plan = reconcile(&drafts(&desired), &current);

        for rec in &current {
            prop_assert_eq!(plan.to_delete.contains(&rec.id), !rec.is_booked());
        }
        prop_assert_eq!(plan.to_create.len(), desired.len());
    }
}

// ---------------------------------------------------------------------------
// Property 4: applying a plan twice leaves the same slots as applying it once
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn apply_is_idempotent(
        current in prop::collection::vec(arb_record(), 0..12),
        desired in prop::collection::btree_set(0u32..48, 0..12),
    ) {
        let records: Vec<SlotRecord> = current.into_iter().enumerate().map(|(i, r)| record(i, r)).collect();
        let desired = drafts(&desired.into_iter().collect::<Vec<_>>());

        let mut once = InMemorySlotStore::from_records(records);
        let mut twice = once.clone();
        apply_plan(&mut once, "req-1", &desired).unwrap();
        apply_plan(&mut twice, "req-1", &desired).unwrap();
        apply_plan(&mut twice, "req-1", &desired).unwrap();

        let view = |store: &InMemorySlotStore| -> BTreeSet<(SlotDraft, bool)> {
            store.list_slots("req-1").unwrap().iter().map(|r| (r.interval(), r.is_booked())).collect()
        };
        prop_assert_eq!(view(&once), view(&twice));
        prop_assert_eq!(once.records().len(), twice.records().len());
    }
}

// ---------------------------------------------------------------------------
// Property 5: an unavailable day has no candidates
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn unavailable_day_has_no_candidates(
        auto in prop::collection::vec(arb_window(), 0..8),
        specific in prop::collection::vec(arb_start(), 0..8),
        dur in arb_duration(),
    ) {
        let rule = DaySlotRule {
            available: false,
            auto_generated_slots: auto,
            excluded_slots: BTreeSet::new(),
            specific_slots: specific,
        };
        let slots = generate_candidates(&rule, dur, "09:00", "17:00", 30).unwrap();
        prop_assert!(slots.is_empty());
    }
}
