//! # slot-engine
//!
//! Timezone-aware compilation of an availability calendar into bookable slots.
//!
//! An operator keeps one availability calendar (which days, which hours) and,
//! per booking request, picks the start times to offer. This crate turns that
//! selection into concrete UTC intervals, turns persisted intervals back into
//! an editable selection, and plans the store mutations that replace a
//! request's slots without touching the ones already booked.
//!
//! ## Modules
//!
//! - [`timezone`]: wall-clock moment in an IANA zone ↔ UTC instant
//! - [`dst`]: resolution of readings inside DST gaps and overlaps
//! - [`day_slots`]: candidate slots for one day
//! - [`converter`]: availability + selection ↔ slot intervals
//! - [`reconciler`]: delete/create plan that preserves booked slots
//! - [`conflict`]: desired slots overlapping booked ones
//! - [`store`]: persistence trait, in-memory store, plan execution
//! - [`settings`]: work hours, slot lengths, site timezone
//! - [`publish`]: clock-based "already in the past" decisions
//! - [`clock_time`]: `"HH:mm"` / `"YYYY-MM-DD"` parsing
//! - [`error`]: Error types

pub mod clock_time;
pub mod conflict;
pub mod converter;
pub mod day_slots;
pub mod dst;
pub mod error;
pub mod publish;
pub mod reconciler;
pub mod settings;
pub mod store;
pub mod timezone;

pub use conflict::{find_booked_overlaps, BookedOverlap};
pub use converter::{
    compile, decompile, enable_all, EnabledSlotSelection, MonthAvailability, SlotDraft,
    SlotSelection,
};
pub use day_slots::{auto_generate, generate_candidates, DaySlotRule, SlotWindow};
pub use error::{SlotError, StoreError};
pub use publish::{resolve_publish_time, Clock, FixedClock, PublishTiming, SystemClock};
pub use reconciler::{reconcile, ReconcilePlan, SlotRecord, SlotStatus};
pub use settings::SchedulingSettings;
pub use store::{apply_plan, ApplyReport, InMemorySlotStore, SlotStore};
pub use timezone::{to_instant, to_wall_clock, WallClockMoment, Zone};
