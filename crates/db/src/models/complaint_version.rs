//! Complaint version snapshot model.

use hostel_core::complaint::{ApprovalStatus, ComplaintStatus};
use hostel_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `complaint_versions` table. Rows are never updated.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ComplaintVersion {
    pub id: DbId,
    pub complaint_id: DbId,
    pub version: i32,
    #[sqlx(try_from = "String")]
    pub status: ComplaintStatus,
    pub admin_notes: String,
    pub estimated_cost: Option<f64>,
    pub actual_cost: Option<f64>,
    #[sqlx(try_from = "String")]
    pub approval_status: ApprovalStatus,
    pub changed_by: Option<DbId>,
    pub change_reason: String,
    pub created_at: Timestamp,
}
