//! Detect desired slots that overlap slots which are already booked.
//!
//! Reconciliation keeps booked records regardless of the new slot set, so a
//! regenerated set can end up offering time a guest already holds. This check
//! is advisory: callers decide whether to warn or refuse.
//! Adjacent intervals (one ends exactly when the other starts) do not overlap.

use serde::{Deserialize, Serialize};

use crate::converter::SlotDraft;
use crate::reconciler::SlotRecord;

/// A desired slot overlapping a booked record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedOverlap {
    pub desired: SlotDraft,
    pub booked_id: String,
    pub overlap_minutes: i64,
}

/// Pair every desired slot with every booked record it overlaps.
pub fn find_booked_overlaps(desired: &[SlotDraft], current: &[SlotRecord]) -> Vec<BookedOverlap> {
    let mut overlaps = Vec::new();

    for record in current.iter().filter(|r| r.is_booked()) {
        for slot in desired {
            if slot.start < record.end && record.start < slot.end {
                let overlap_start = slot.start.max(record.start);
                let overlap_end = slot.end.min(record.end);
                overlaps.push(BookedOverlap {
                    desired: *slot,
                    booked_id: record.id.clone(),
                    overlap_minutes: (overlap_end - overlap_start).num_minutes(),
                });
            }
        }
    }

    overlaps
}
