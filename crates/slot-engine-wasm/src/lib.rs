//! WASM bindings for slot-engine.
//!
//! Exposes candidate generation, slot compilation, decompilation and
//! reconciliation to the admin panel via `wasm-bindgen`. Complex values cross
//! the boundary as JSON strings; instants are epoch milliseconds, as the
//! panel's data store keeps them.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir pkg/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use slot_engine::{
    EnabledSlotSelection, MonthAvailability, SchedulingSettings, SlotDraft, SlotRecord, SlotStatus,
    WallClockMoment,
};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

/// A slot interval in epoch milliseconds.
#[derive(Serialize, Deserialize)]
struct SlotDto {
    start: i64,
    end: i64,
}

impl From<&SlotDraft> for SlotDto {
    fn from(s: &SlotDraft) -> Self {
        Self {
            start: s.start.timestamp_millis(),
            end: s.end.timestamp_millis(),
        }
    }
}

impl SlotDto {
    fn to_draft(&self) -> Result<SlotDraft, String> {
        Ok(SlotDraft::new(from_millis(self.start)?, from_millis(self.end)?))
    }
}

/// A persisted slot as the data store returns it.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordInput {
    id: String,
    request_id: String,
    start: i64,
    end: i64,
    status: String,
    #[serde(default)]
    booked_by_invite_id: Option<String>,
}

impl RecordInput {
    fn to_record(&self) -> Result<SlotRecord, String> {
        let status = match (self.status.as_str(), &self.booked_by_invite_id) {
            ("available", _) => SlotStatus::Available,
            ("booked", Some(invite)) => SlotStatus::Booked {
                booked_by_invite_id: invite.clone(),
            },
            ("booked", None) => {
                return Err(format!("Booked slot {} has no bookedByInviteId", self.id))
            }
            (other, _) => return Err(format!("Unknown slot status '{}'", other)),
        };
        Ok(SlotRecord {
            id: self.id.clone(),
            request_id: self.request_id.clone(),
            start: from_millis(self.start)?,
            end: from_millis(self.end)?,
            status,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanDto {
    to_delete: Vec<String>,
    to_create: Vec<SlotDto>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OverlapDto {
    desired: SlotDto,
    booked_id: String,
    overlap_minutes: i64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn from_millis(ms: i64) -> Result<DateTime<Utc>, String> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| format!("Instant out of range: {}", ms))
}

fn parse_json<T: for<'de> Deserialize<'de>>(what: &str, json: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn parse_slots(json: &str) -> Result<Vec<SlotDraft>, String> {
    parse_json::<Vec<SlotDto>>("slots", json)?
        .iter()
        .map(SlotDto::to_draft)
        .collect()
}

fn parse_records(json: &str) -> Result<Vec<SlotRecord>, String> {
    parse_json::<Vec<RecordInput>>("records", json)?
        .iter()
        .map(RecordInput::to_record)
        .collect()
}

// ---------------------------------------------------------------------------
// Implementations (plain `String` errors so they run natively in tests)
// ---------------------------------------------------------------------------

fn generate_candidates_impl(
    rule_json: &str,
    duration_minutes: u32,
    work_start: &str,
    work_end: &str,
    step_minutes: u32,
) -> Result<String, String> {
    let rule = parse_json("rule", rule_json)?;
    let slots = slot_engine::generate_candidates(
        &rule,
        duration_minutes,
        work_start,
        work_end,
        step_minutes,
    )
    .map_err(|e| e.to_string())?;
    to_json(&slots)
}

fn parse_settings(json: &str) -> Result<SchedulingSettings, String> {
    SchedulingSettings::from_json(json).map_err(|e| e.to_string())
}

fn candidates_for_date_impl(settings_json: &str, date: &str) -> Result<String, String> {
    let slots = parse_settings(settings_json)?
        .candidates_for(date)
        .map_err(|e| e.to_string())?;
    to_json(&slots)
}

fn availability_for_range_impl(settings_json: &str, from: &str, to: &str) -> Result<String, String> {
    let availability = parse_settings(settings_json)?
        .availability_for_range(from, to)
        .map_err(|e| e.to_string())?;
    to_json(&availability)
}

fn compile_impl(
    availability_json: &str,
    enabled_json: &str,
    duration_minutes: u32,
    timezone: &str,
) -> Result<String, String> {
    let availability: MonthAvailability = parse_json("availability", availability_json)?;
    let enabled: EnabledSlotSelection = parse_json("enabled", enabled_json)?;
    let slots = slot_engine::compile(&availability, &enabled, duration_minutes, timezone)
        .map_err(|e| e.to_string())?;
    to_json(&slots.iter().map(SlotDto::from).collect::<Vec<_>>())
}

fn decompile_impl(
    slots_json: &str,
    availability_json: &str,
    timezone: &str,
) -> Result<String, String> {
    let slots = parse_slots(slots_json)?;
    let availability: MonthAvailability = parse_json("availability", availability_json)?;
    to_json(&slot_engine::decompile(&slots, &availability, timezone))
}

fn reconcile_impl(desired_json: &str, current_json: &str) -> Result<String, String> {
    let desired = parse_slots(desired_json)?;
    let current = parse_records(current_json)?;
    let plan = slot_engine::reconcile(&desired, &current);
    to_json(&PlanDto {
        to_delete: plan.to_delete.into_iter().collect(),
        to_create: plan.to_create.iter().map(SlotDto::from).collect(),
    })
}

fn overlaps_impl(desired_json: &str, current_json: &str) -> Result<String, String> {
    let desired = parse_slots(desired_json)?;
    let current = parse_records(current_json)?;
    let overlaps: Vec<OverlapDto> = slot_engine::find_booked_overlaps(&desired, &current)
        .iter()
        .map(|o| OverlapDto {
            desired: SlotDto::from(&o.desired),
            booked_id: o.booked_id.clone(),
            overlap_minutes: o.overlap_minutes,
        })
        .collect();
    to_json(&overlaps)
}

fn to_instant_impl(date: &str, time: &str, timezone: &str) -> Result<f64, String> {
    let instant = slot_engine::to_instant(&WallClockMoment::new(date, time), timezone)
        .map_err(|e| e.to_string())?;
    Ok(instant.timestamp_millis() as f64)
}

fn to_wall_clock_impl(epoch_ms: f64, timezone: &str) -> Result<String, String> {
    if !epoch_ms.is_finite() {
        return Err(format!("Invalid epoch milliseconds: {}", epoch_ms));
    }
    let instant = from_millis(epoch_ms as i64)?;
    to_json(&slot_engine::to_wall_clock(&instant, timezone))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Candidate `{start, end}` clock-time slots for one day's rule (rule as JSON).
#[wasm_bindgen(js_name = "generateCandidates")]
pub fn generate_candidates(
    rule_json: &str,
    duration_minutes: u32,
    work_start: &str,
    work_end: &str,
    step_minutes: u32,
) -> Result<String, JsValue> {
    generate_candidates_impl(rule_json, duration_minutes, work_start, work_end, step_minutes)
        .map_err(|e| JsValue::from_str(&e))
}

/// Candidate slots for one date under the given settings JSON.
#[wasm_bindgen(js_name = "candidatesForDate")]
pub fn candidates_for_date(settings_json: &str, date: &str) -> Result<String, JsValue> {
    candidates_for_date_impl(settings_json, date).map_err(|e| JsValue::from_str(&e))
}

/// `MonthAvailability` JSON for every date in `[from, to]`.
#[wasm_bindgen(js_name = "availabilityForRange")]
pub fn availability_for_range(settings_json: &str, from: &str, to: &str) -> Result<String, JsValue> {
    availability_for_range_impl(settings_json, from, to).map_err(|e| JsValue::from_str(&e))
}

/// Compile availability + enabled start times into `{start, end}` epoch-ms slots.
///
/// Fails with "Select at least one day and one time slot" when nothing is
/// selected.
#[wasm_bindgen(js_name = "compileSlots")]
pub fn compile_slots(
    availability_json: &str,
    enabled_json: &str,
    duration_minutes: u32,
    timezone: &str,
) -> Result<String, JsValue> {
    compile_impl(availability_json, enabled_json, duration_minutes, timezone)
        .map_err(|e| JsValue::from_str(&e))
}

/// Rebuild `{availability, enabled}` from epoch-ms slots.
#[wasm_bindgen(js_name = "decompileSlots")]
pub fn decompile_slots(
    slots_json: &str,
    availability_json: &str,
    timezone: &str,
) -> Result<String, JsValue> {
    decompile_impl(slots_json, availability_json, timezone).map_err(|e| JsValue::from_str(&e))
}

/// Plan `{toDelete, toCreate}` for a request's persisted slots.
#[wasm_bindgen(js_name = "reconcileSlots")]
pub fn reconcile_slots(desired_json: &str, current_json: &str) -> Result<String, JsValue> {
    reconcile_impl(desired_json, current_json).map_err(|e| JsValue::from_str(&e))
}

/// Desired slots that overlap booked records.
#[wasm_bindgen(js_name = "findBookedOverlaps")]
pub fn find_booked_overlaps(desired_json: &str, current_json: &str) -> Result<String, JsValue> {
    overlaps_impl(desired_json, current_json).map_err(|e| JsValue::from_str(&e))
}

/// Wall-clock date and time in `timezone` → epoch milliseconds.
#[wasm_bindgen(js_name = "toInstant")]
pub fn to_instant(date: &str, time: &str, timezone: &str) -> Result<f64, JsValue> {
    to_instant_impl(date, time, timezone).map_err(|e| JsValue::from_str(&e))
}

/// Epoch milliseconds → `{date, time}` in `timezone`.
#[wasm_bindgen(js_name = "toWallClock")]
pub fn to_wall_clock(epoch_ms: f64, timezone: &str) -> Result<String, JsValue> {
    to_wall_clock_impl(epoch_ms, timezone).map_err(|e| JsValue::from_str(&e))
}
