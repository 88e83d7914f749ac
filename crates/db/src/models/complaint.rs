//! Complaint entity model and DTOs.

use hostel_core::complaint::{
    proof_image, ApprovalStatus, Category, ComplaintSort, ComplaintStatus, Priority,
};
use hostel_core::duplicate_detection::{DuplicateCandidate, HistoryEntry};
use hostel_core::lifecycle::LifecycleState;
use hostel_core::pagination::Pagination;
use hostel_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `complaints` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Complaint {
    pub id: DbId,
    pub title: String,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub category: Category,
    #[sqlx(try_from = "String")]
    pub status: ComplaintStatus,
    #[sqlx(try_from = "String")]
    pub priority: Priority,
    pub student_id: DbId,
    pub images: Vec<String>,
    pub admin_notes: String,
    pub estimated_cost: Option<f64>,
    pub actual_cost: Option<f64>,
    pub currency: String,
    #[sqlx(try_from = "String")]
    pub approval_status: ApprovalStatus,
    pub approved_by: Option<DbId>,
    pub approved_at: Option<Timestamp>,
    pub rejection_reason: String,
    pub version: i32,
    pub deleted_at: Option<Timestamp>,
    pub deleted_by: Option<DbId>,
    pub estimated_days: Option<i32>,
    pub expected_completion_date: Option<Timestamp>,
    pub resolution_rating: Option<i16>,
    pub resolution_feedback: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub resolved_at: Option<Timestamp>,
}

impl Complaint {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// The fields tracked mutations operate on.
    pub fn lifecycle_state(&self) -> LifecycleState {
        LifecycleState {
            id: self.id,
            student_id: self.student_id,
            title: self.title.clone(),
            priority: self.priority,
            status: self.status,
            admin_notes: self.admin_notes.clone(),
            estimated_cost: self.estimated_cost,
            actual_cost: self.actual_cost,
            approval_status: self.approval_status,
            approved_by: self.approved_by,
            approved_at: self.approved_at,
            rejection_reason: self.rejection_reason.clone(),
            estimated_days: self.estimated_days,
            expected_completion_date: self.expected_completion_date,
            resolved_at: self.resolved_at,
            version: self.version,
            updated_at: self.updated_at,
        }
    }
}

impl HistoryEntry for Complaint {
    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn into_candidate(self) -> DuplicateCandidate {
        DuplicateCandidate {
            id: self.id,
            title: self.title,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// Complaint as returned to clients, with the first image surfaced.
#[derive(Debug, Clone, Serialize)]
pub struct ComplaintResponse {
    #[serde(flatten)]
    pub complaint: Complaint,
    pub proof_image: Option<String>,
}

impl From<Complaint> for ComplaintResponse {
    fn from(complaint: Complaint) -> Self {
        let proof_image = proof_image(&complaint.images).map(str::to_owned);
        Self {
            complaint,
            proof_image,
        }
    }
}

/// Validated input for inserting a complaint.
#[derive(Debug, Clone)]
pub struct CreateComplaint {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub student_id: DbId,
    pub images: Vec<String>,
}

/// Student edit of a pending complaint. All fields optional.
#[derive(Debug, Clone, Default)]
pub struct UpdateComplaint {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
}

/// Filters for the complaint listing.
#[derive(Debug, Clone, Default)]
pub struct ComplaintFilter {
    /// Restrict to one student's complaints.
    pub student_id: Option<DbId>,
    pub status: Option<ComplaintStatus>,
    /// Case-insensitive substring over title and description.
    pub search: Option<String>,
    pub include_deleted: bool,
    pub sort: ComplaintSort,
    pub pagination: Pagination,
}
