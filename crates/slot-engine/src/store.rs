//! Slot persistence boundary and plan execution.
//!
//! # Responsibility
//! - Define the minimal store contract the engine needs (`SlotStore`).
//! - Execute a [`ReconcilePlan`] against a store: deletes first, then creates.
//!
//! # Invariants
//! - A store must refuse to remove a booked record (`StoreError::Booked`).
//! - Execution is not transactional. Re-running [`apply_plan`] after an
//!   interruption converges to the same end state, because every available
//!   record is deleted and the desired set recreated on each run.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::converter::SlotDraft;
use crate::error::{Result, StoreError};
use crate::reconciler::{reconcile, ReconcilePlan, SlotRecord, SlotStatus};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persistence interface for slot records.
pub trait SlotStore {
    fn list_slots(&self, request_id: &str) -> StoreResult<Vec<SlotRecord>>;
    /// Persist an available slot and return its new id.
    fn create_slot(&mut self, request_id: &str, slot: SlotDraft) -> StoreResult<String>;
    fn remove_slot(&mut self, id: &str) -> StoreResult<()>;
}

/// Outcome of executing a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReport {
    pub deleted: Vec<String>,
    pub created: Vec<String>,
    /// Deletes refused because the record was booked after it was read.
    pub skipped_booked: Vec<String>,
    /// Deletes of records that no longer existed.
    pub already_gone: Vec<String>,
}

/// Replace the available slots of `request_id` with `desired`.
///
/// # Errors
/// Returns `SlotError::Store` for backend failures. Work done before the
/// failure stays done; calling again with the same arguments finishes it.
pub fn apply_plan<S: SlotStore + ?Sized>(
    store: &mut S,
    request_id: &str,
    desired: &[SlotDraft],
) -> Result<ApplyReport> {
    let current = store.list_slots(request_id)?;
    let plan = reconcile(desired, &current);
    info!(
        request_id,
        current = current.len(),
        delete = plan.to_delete.len(),
        create = plan.to_create.len(),
        "applying slot plan"
    );
    execute(store, request_id, &plan)
}

/// Execute an already computed plan.
///
/// # Errors
/// Same as [`apply_plan`].
pub fn execute<S: SlotStore + ?Sized>(
    store: &mut S,
    request_id: &str,
    plan: &ReconcilePlan,
) -> Result<ApplyReport> {
    let mut report = ApplyReport::default();

    for id in &plan.to_delete {
        match store.remove_slot(id) {
            Ok(()) => {
                debug!(id = id.as_str(), "removed slot");
                report.deleted.push(id.clone());
            }
            Err(StoreError::NotFound(_)) => {
                debug!(id = id.as_str(), "slot already removed");
                report.already_gone.push(id.clone());
            }
            Err(StoreError::Booked(_)) => {
                warn!(id = id.as_str(), "slot was booked before it could be removed; keeping it");
                report.skipped_booked.push(id.clone());
            }
            Err(err) => return Err(err.into()),
        }
    }

    for slot in &plan.to_create {
        let id = store.create_slot(request_id, *slot)?;
        debug!(id = id.as_str(), start = %slot.start, end = %slot.end, "created slot");
        report.created.push(id);
    }

    Ok(report)
}

/// A `SlotStore` held in memory. Serializable so it can back a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InMemorySlotStore {
    #[serde(default)]
    records: Vec<SlotRecord>,
    #[serde(default)]
    next_id: u64,
}

impl InMemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<SlotRecord>) -> Self {
        Self {
            records,
            next_id: 0,
        }
    }

    pub fn records(&self) -> &[SlotRecord] {
        &self.records
    }

    /// Mark an available slot as booked by an invite.
    pub fn book(&mut self, id: &str, invite_id: impl Into<String>) -> StoreResult<()> {
        let record = self.find_mut(id)?;
        if record.is_booked() {
            return Err(StoreError::Booked(id.to_string()));
        }
        record.status = SlotStatus::Booked {
            booked_by_invite_id: invite_id.into(),
        };
        Ok(())
    }

    /// Cancel a booking, making the slot available again.
    pub fn cancel(&mut self, id: &str) -> StoreResult<()> {
        self.find_mut(id)?.status = SlotStatus::Available;
        Ok(())
    }

    fn find_mut(&mut self, id: &str) -> StoreResult<&mut SlotRecord> {
        self.records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn fresh_id(&mut self) -> String {
        loop {
            self.next_id += 1;
            let id = format!("slot-{}", self.next_id);
            if !self.records.iter().any(|r| r.id == id) {
                return id;
            }
        }
    }
}

impl SlotStore for InMemorySlotStore {
    fn list_slots(&self, request_id: &str) -> StoreResult<Vec<SlotRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.request_id == request_id)
            .cloned()
            .collect())
    }

    fn create_slot(&mut self, request_id: &str, slot: SlotDraft) -> StoreResult<String> {
        if slot.end <= slot.start {
            return Err(StoreError::Backend(format!(
                "slot must end after it starts: {} .. {}",
                slot.start, slot.end
            )));
        }
        let id = self.fresh_id();
        self.records
            .push(SlotRecord::available(id.clone(), request_id, slot));
        Ok(id)
    }

    fn remove_slot(&mut self, id: &str) -> StoreResult<()> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if self.records[index].is_booked() {
            return Err(StoreError::Booked(id.to_string()));
        }
        self.records.remove(index);
        Ok(())
    }
}
