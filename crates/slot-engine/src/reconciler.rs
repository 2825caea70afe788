//! Plan the store mutations that move a request's persisted slots to a new
//! desired set.
//!
//! The policy is deliberately blunt: every available record is deleted and the
//! whole desired set is recreated. Booked records are never deleted; a booking
//! has to be cancelled (which makes the record available again) before a
//! regeneration can remove it.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::converter::SlotDraft;

/// Booking state of a persisted slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SlotStatus {
    Available,
    #[serde(rename_all = "camelCase")]
    Booked { booked_by_invite_id: String },
}

/// A persisted, bookable slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRecord {
    pub id: String,
    pub request_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(flatten)]
    pub status: SlotStatus,
}

impl SlotRecord {
    pub fn available(id: impl Into<String>, request_id: impl Into<String>, slot: SlotDraft) -> Self {
        Self {
            id: id.into(),
            request_id: request_id.into(),
            start: slot.start,
            end: slot.end,
            status: SlotStatus::Available,
        }
    }

    pub fn is_booked(&self) -> bool {
        matches!(self.status, SlotStatus::Booked { .. })
    }

    pub fn interval(&self) -> SlotDraft {
        SlotDraft::new(self.start, self.end)
    }
}

/// Store mutations to execute, deletes first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcilePlan {
    pub to_delete: BTreeSet<String>,
    pub to_create: Vec<SlotDraft>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_create.is_empty()
    }
}

/// Plan the transition from `current` records to the `desired` slot set.
///
/// Overlap between `desired` and surviving booked records is not checked
/// here; see [`find_booked_overlaps`](crate::conflict::find_booked_overlaps).
pub fn reconcile(desired: &[SlotDraft], current: &[SlotRecord]) -> ReconcilePlan {
    let to_delete = current
        .iter()
        .filter_map(|record| match record.status {
            SlotStatus::Available => Some(record.id.clone()),
            SlotStatus::Booked { .. } => None,
        })
        .collect();

    ReconcilePlan {
        to_delete,
        to_create: desired.to_vec(),
    }
}
