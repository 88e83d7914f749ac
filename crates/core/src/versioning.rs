//! Snapshot log of the mutable complaint fields.
//!
//! Each tracked mutation bumps the complaint's version and produces exactly
//! one [`VersionEntry`], written in the same transaction as the complaint.

use serde::Serialize;

use crate::complaint::{ApprovalStatus, ComplaintStatus};
use crate::lifecycle::LifecycleState;
use crate::types::DbId;

/// The fields captured by every version row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionSnapshot {
    pub status: ComplaintStatus,
    pub admin_notes: String,
    pub estimated_cost: Option<f64>,
    pub actual_cost: Option<f64>,
    pub approval_status: ApprovalStatus,
}

impl VersionSnapshot {
    pub fn of(state: &LifecycleState) -> Self {
        Self {
            status: state.status,
            admin_notes: state.admin_notes.clone(),
            estimated_cost: state.estimated_cost,
            actual_cost: state.actual_cost,
            approval_status: state.approval_status,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VersionEntry {
    pub complaint_id: DbId,
    pub version: i32,
    pub snapshot: VersionSnapshot,
    pub changed_by: Option<DbId>,
    pub change_reason: String,
}

/// Increment `state.version` and snapshot the (already mutated) state.
pub fn record(
    state: &mut LifecycleState,
    changed_by: Option<DbId>,
    reason: String,
) -> VersionEntry {
    state.version += 1;
    VersionEntry {
        complaint_id: state.id,
        version: state.version,
        snapshot: VersionSnapshot::of(state),
        changed_by,
        change_reason: reason,
    }
}

pub fn status_reason(old: ComplaintStatus, new: ComplaintStatus) -> String {
    format!("Status: {old} → {new}")
}

pub const COST_UPDATE_REASON: &str = "Cost update";

pub fn approval_reason(action: impl std::fmt::Display) -> String {
    format!("Approval: {action}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::tests::sample_state;

    #[test]
    fn record_bumps_version_and_captures_fields() {
        let mut state = sample_state();
        state.admin_notes = "Carpenter booked".into();
        state.estimated_cost = Some(450.0);

        let entry = record(&mut state, Some(99), "Cost update".into());

        assert_eq!(state.version, 2);
        assert_eq!(entry.version, 2);
        assert_eq!(entry.complaint_id, state.id);
        assert_eq!(entry.changed_by, Some(99));
        assert_eq!(entry.snapshot.admin_notes, "Carpenter booked");
        assert_eq!(entry.snapshot.estimated_cost, Some(450.0));
        assert_eq!(entry.snapshot.approval_status, ApprovalStatus::PendingApproval);
    }

    #[test]
    fn reasons_are_formatted() {
        assert_eq!(
            status_reason(ComplaintStatus::Pending, ComplaintStatus::InProgress),
            "Status: pending → in_progress"
        );
        assert_eq!(approval_reason("rejected"), "Approval: rejected");
    }

    #[test]
    fn snapshot_serializes_with_stored_names() {
        let snapshot = VersionSnapshot::of(&sample_state());
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["approval_status"], "pending_approval");
        assert!(json["estimated_cost"].is_null());
    }
}
