//! Complaint lifecycle rules.
//!
//! [`LifecycleState`] is the slice of a complaint that tracked mutations
//! touch. The `apply_*` methods validate a command, mutate the state, record
//! a version entry and describe the notifications the change should emit.
//! Persistence and locking are the caller's job; these functions never do
//! I/O so they can be exercised directly in unit tests.
//!
//! Status transitions are admin-only and unrestricted: any status may move to
//! any other status. `resolved_at` is stamped every time the status is set to
//! `resolved` and is never cleared when a complaint is reopened.

use crate::complaint::{
    expected_completion, validate_cost, ApprovalStatus, ComplaintStatus, Priority,
};
use crate::error::CoreError;
use crate::outbox::{NotificationDraft, NotificationKind, NotificationPriority, Outbox};
use crate::types::{DbId, Timestamp};
use crate::versioning::{self, VersionEntry};

define_text_enum! {
    /// Decision submitted to the approval endpoint.
    ApprovalAction ("approval action") {
        Approved = "approved",
        Rejected = "rejected",
    }
}

// ---------------------------------------------------------------------------
// Actor and authorization
// ---------------------------------------------------------------------------

/// The authenticated caller of a lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DbId,
    pub is_admin: bool,
}

impl Actor {
    pub fn student(user_id: DbId) -> Self {
        Self { user_id, is_admin: false }
    }

    pub fn admin(user_id: DbId) -> Self {
        Self { user_id, is_admin: true }
    }

    pub fn owns(&self, student_id: DbId) -> bool {
        self.user_id == student_id
    }
}

pub fn require_admin(actor: &Actor) -> Result<(), CoreError> {
    if !actor.is_admin {
        return Err(CoreError::Forbidden("Admin access required".into()));
    }
    Ok(())
}

/// Owners and admins may read a complaint and its history.
pub fn authorize_view(student_id: DbId, actor: &Actor) -> Result<(), CoreError> {
    if actor.is_admin || actor.owns(student_id) {
        return Ok(());
    }
    Err(CoreError::Forbidden(
        "Not authorized to view this complaint".into(),
    ))
}

/// Students may delete their own complaints in any status; admins may only
/// delete resolved ones.
pub fn authorize_soft_delete(
    student_id: DbId,
    status: ComplaintStatus,
    actor: &Actor,
) -> Result<(), CoreError> {
    if actor.owns(student_id) {
        return Ok(());
    }
    if !actor.is_admin {
        return Err(CoreError::Forbidden(
            "Not authorized to delete this complaint".into(),
        ));
    }
    if status != ComplaintStatus::Resolved {
        return Err(CoreError::Validation(
            "Admins can only delete resolved complaints".into(),
        ));
    }
    Ok(())
}

pub fn authorize_student_edit(
    student_id: DbId,
    status: ComplaintStatus,
    actor: &Actor,
) -> Result<(), CoreError> {
    if !actor.owns(student_id) {
        return Err(CoreError::Forbidden(
            "Not authorized to update this complaint".into(),
        ));
    }
    if status != ComplaintStatus::Pending {
        return Err(CoreError::Validation(
            "Can only update pending complaints".into(),
        ));
    }
    Ok(())
}

pub fn authorize_feedback(
    student_id: DbId,
    status: ComplaintStatus,
    actor: &Actor,
) -> Result<(), CoreError> {
    if !actor.owns(student_id) {
        return Err(CoreError::Forbidden(
            "Not authorized to rate this complaint".into(),
        ));
    }
    if status != ComplaintStatus::Resolved {
        return Err(CoreError::Validation(
            "You can rate only resolved complaints".into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Admin status transition with optional partial updates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusChange {
    pub status: ComplaintStatus,
    pub admin_notes: Option<String>,
    pub estimated_cost: Option<f64>,
    pub actual_cost: Option<f64>,
    pub estimated_days: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostUpdate {
    pub estimated_cost: Option<f64>,
    pub actual_cost: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalDecision {
    pub action: ApprovalAction,
    pub rejection_reason: Option<String>,
}

/// Result of a tracked mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub version: VersionEntry,
    pub outbox: Outbox,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleState {
    pub id: DbId,
    pub student_id: DbId,
    pub title: String,
    pub priority: Priority,
    pub status: ComplaintStatus,
    pub admin_notes: String,
    pub estimated_cost: Option<f64>,
    pub actual_cost: Option<f64>,
    pub approval_status: ApprovalStatus,
    pub approved_by: Option<DbId>,
    pub approved_at: Option<Timestamp>,
    pub rejection_reason: String,
    pub estimated_days: Option<i32>,
    pub expected_completion_date: Option<Timestamp>,
    pub resolved_at: Option<Timestamp>,
    pub version: i32,
    pub updated_at: Timestamp,
}

fn validate_costs(estimated: Option<f64>, actual: Option<f64>) -> Result<(), CoreError> {
    if let Some(value) = estimated {
        validate_cost("Estimated cost", value)?;
    }
    if let Some(value) = actual {
        validate_cost("Actual cost", value)?;
    }
    Ok(())
}

impl LifecycleState {
    pub fn apply_status_change(
        &mut self,
        change: StatusChange,
        actor: &Actor,
        now: Timestamp,
    ) -> Result<Applied, CoreError> {
        require_admin(actor)?;
        let completion = change
            .estimated_days
            .map(|days| expected_completion(now, days))
            .transpose()?;
        validate_costs(change.estimated_cost, change.actual_cost)?;

        let old_status = self.status;
        self.status = change.status;
        if let Some(notes) = change.admin_notes {
            self.admin_notes = notes;
        }
        if let Some(cost) = change.estimated_cost {
            self.estimated_cost = Some(cost);
        }
        if let Some(cost) = change.actual_cost {
            self.actual_cost = Some(cost);
        }
        if let Some(date) = completion {
            self.estimated_days = change.estimated_days;
            self.expected_completion_date = Some(date);
        }
        if change.status == ComplaintStatus::Resolved {
            self.resolved_at = Some(now);
        }
        self.updated_at = now;

        let version = versioning::record(
            self,
            Some(actor.user_id),
            versioning::status_reason(old_status, change.status),
        );

        let mut outbox = Outbox::new();
        outbox.notify(NotificationDraft {
            user_id: self.student_id,
            complaint_id: Some(self.id),
            message: format!(
                "Your complaint \"{}\" status updated to {}",
                self.title, self.status
            ),
            kind: NotificationKind::StatusUpdate,
            priority: NotificationPriority::Normal,
        });
        if self.priority == Priority::High
            && matches!(
                self.status,
                ComplaintStatus::InProgress | ComplaintStatus::Resolved
            )
        {
            outbox.notify(NotificationDraft {
                user_id: self.student_id,
                complaint_id: Some(self.id),
                message: format!(
                    "High-priority complaint \"{}\" is now {}.",
                    self.title, self.status
                ),
                kind: NotificationKind::HighPriorityAlert,
                priority: NotificationPriority::High,
            });
        }

        Ok(Applied { version, outbox })
    }

    pub fn apply_cost_update(
        &mut self,
        update: CostUpdate,
        actor: &Actor,
        now: Timestamp,
    ) -> Result<Applied, CoreError> {
        require_admin(actor)?;
        validate_costs(update.estimated_cost, update.actual_cost)?;

        if let Some(cost) = update.estimated_cost {
            self.estimated_cost = Some(cost);
        }
        if let Some(cost) = update.actual_cost {
            self.actual_cost = Some(cost);
        }
        self.updated_at = now;

        let version = versioning::record(
            self,
            Some(actor.user_id),
            versioning::COST_UPDATE_REASON.to_string(),
        );
        Ok(Applied {
            version,
            outbox: Outbox::new(),
        })
    }

    pub fn apply_approval(
        &mut self,
        decision: ApprovalDecision,
        actor: &Actor,
        now: Timestamp,
    ) -> Result<Applied, CoreError> {
        require_admin(actor)?;

        match decision.action {
            ApprovalAction::Approved => {
                self.approval_status = ApprovalStatus::Approved;
                self.approved_by = Some(actor.user_id);
                self.approved_at = Some(now);
                self.rejection_reason.clear();
            }
            ApprovalAction::Rejected => {
                self.approval_status = ApprovalStatus::Rejected;
                self.rejection_reason = decision.rejection_reason.unwrap_or_default();
            }
        }
        self.updated_at = now;

        let version = versioning::record(
            self,
            Some(actor.user_id),
            versioning::approval_reason(decision.action),
        );
        Ok(Applied {
            version,
            outbox: Outbox::new(),
        })
    }
}
