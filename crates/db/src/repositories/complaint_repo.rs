//! Repository for the `complaints` table.
//!
//! "Live" queries exclude soft-deleted rows. Tracked mutations go through
//! [`ComplaintRepo::lock_live_for_update`] and [`ComplaintRepo::write_lifecycle`]
//! inside a caller-owned transaction, alongside the version insert.

use hostel_core::complaint::ComplaintSort;
use hostel_core::duplicate_detection::escape_like;
use hostel_core::lifecycle::LifecycleState;
use hostel_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::complaint::{Complaint, ComplaintFilter, CreateComplaint, UpdateComplaint};
use crate::repositories::PgTx;

/// Column list for `complaints` queries.
const COLUMNS: &str = "id, title, description, category, status, priority, student_id, images, \
    admin_notes, estimated_cost, actual_cost, currency, approval_status, approved_by, \
    approved_at, rejection_reason, version, deleted_at, deleted_by, estimated_days, \
    expected_completion_date, resolution_rating, resolution_feedback, created_at, \
    updated_at, resolved_at";

/// Shared `WHERE` clause for [`ComplaintRepo::list`] and [`ComplaintRepo::count`].
const LIST_FILTER: &str = "($1::BIGINT IS NULL OR student_id = $1) \
    AND ($2::TEXT IS NULL OR status = $2) \
    AND ($3::TEXT IS NULL OR title ILIKE $3 OR description ILIKE $3) \
    AND ($4 OR deleted_at IS NULL)";

fn sort_column(sort: ComplaintSort) -> &'static str {
    match sort {
        ComplaintSort::CreatedAt => "created_at",
        ComplaintSort::UpdatedAt => "updated_at",
    }
}

fn search_pattern(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", escape_like(s)))
}

/// Provides persistence for complaints.
pub struct ComplaintRepo;

impl ComplaintRepo {
    /// Insert a new complaint in `pending` / `pending_approval` at version 1.
    pub async fn create(pool: &PgPool, input: &CreateComplaint) -> Result<Complaint, sqlx::Error> {
        let query = format!(
            "INSERT INTO complaints (title, description, category, priority, student_id, images)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Complaint>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.category.as_str())
            .bind(input.priority.as_str())
            .bind(input.student_id)
            .bind(&input.images)
            .fetch_one(pool)
            .await
    }

    /// Find a complaint that has not been soft-deleted.
    pub async fn find_live(pool: &PgPool, id: DbId) -> Result<Option<Complaint>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM complaints WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Complaint>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a complaint by ID, including soft-deleted rows.
    pub async fn find_by_id_include_deleted(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Complaint>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM complaints WHERE id = $1");
        sqlx::query_as::<_, Complaint>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock a live complaint row for the rest of the transaction.
    pub async fn lock_live_for_update(
        tx: &mut PgTx<'_>,
        id: DbId,
    ) -> Result<Option<Complaint>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM complaints WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"
        );
        sqlx::query_as::<_, Complaint>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Persist the tracked fields of `state`.
    ///
    /// The write only applies while the stored version still equals
    /// `expected_version`; `None` means another writer got there first.
    pub async fn write_lifecycle(
        tx: &mut PgTx<'_>,
        state: &LifecycleState,
        expected_version: i32,
    ) -> Result<Option<Complaint>, sqlx::Error> {
        let query = format!(
            "UPDATE complaints SET
                status = $3,
                admin_notes = $4,
                estimated_cost = $5,
                actual_cost = $6,
                approval_status = $7,
                approved_by = $8,
                approved_at = $9,
                rejection_reason = $10,
                estimated_days = $11,
                expected_completion_date = $12,
                resolved_at = $13,
                version = $14,
                updated_at = $15
             WHERE id = $1 AND version = $2 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Complaint>(&query)
            .bind(state.id)
            .bind(expected_version)
            .bind(state.status.as_str())
            .bind(&state.admin_notes)
            .bind(state.estimated_cost)
            .bind(state.actual_cost)
            .bind(state.approval_status.as_str())
            .bind(state.approved_by)
            .bind(state.approved_at)
            .bind(&state.rejection_reason)
            .bind(state.estimated_days)
            .bind(state.expected_completion_date)
            .bind(state.resolved_at)
            .bind(state.version)
            .bind(state.updated_at)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Apply a student edit. Only non-`None` fields are changed.
    pub async fn update_details(
        tx: &mut PgTx<'_>,
        id: DbId,
        input: &UpdateComplaint,
    ) -> Result<Option<Complaint>, sqlx::Error> {
        let query = format!(
            "UPDATE complaints SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                priority = COALESCE($5, priority),
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Complaint>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.category.map(|c| c.as_str()))
            .bind(input.priority.map(|p| p.as_str()))
            .fetch_optional(&mut **tx)
            .await
    }

    /// Record the owner's rating. Existing feedback is kept when `feedback` is `None`.
    pub async fn submit_feedback(
        tx: &mut PgTx<'_>,
        id: DbId,
        rating: i16,
        feedback: Option<&str>,
    ) -> Result<Option<Complaint>, sqlx::Error> {
        let query = format!(
            "UPDATE complaints SET
                resolution_rating = $2,
                resolution_feedback = COALESCE($3, resolution_feedback),
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Complaint>(&query)
            .bind(id)
            .bind(rating)
            .bind(feedback)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Soft-delete a live complaint. Returns `true` if a row was marked.
    pub async fn soft_delete(
        tx: &mut PgTx<'_>,
        id: DbId,
        deleted_by: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE complaints SET deleted_at = NOW(), deleted_by = $2, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(deleted_by)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Clear the soft-delete marker. `None` if the row is missing or not deleted.
    pub async fn restore(pool: &PgPool, id: DbId) -> Result<Option<Complaint>, sqlx::Error> {
        let query = format!(
            "UPDATE complaints SET deleted_at = NULL, deleted_by = NULL, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NOT NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Complaint>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of complaints matching `filter`, newest first by the sort column.
    pub async fn list(
        pool: &PgPool,
        filter: &ComplaintFilter,
    ) -> Result<Vec<Complaint>, sqlx::Error> {
        let order = sort_column(filter.sort);
        let query = format!(
            "SELECT {COLUMNS} FROM complaints
             WHERE {LIST_FILTER}
             ORDER BY {order} DESC, id DESC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, Complaint>(&query)
            .bind(filter.student_id)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(search_pattern(filter.search.as_deref()))
            .bind(filter.include_deleted)
            .bind(filter.pagination.limit)
            .bind(filter.pagination.offset())
            .fetch_all(pool)
            .await
    }

    /// Total rows matching `filter`, ignoring pagination.
    pub async fn count(pool: &PgPool, filter: &ComplaintFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM complaints WHERE {LIST_FILTER}");
        sqlx::query_scalar(&query)
            .bind(filter.student_id)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(search_pattern(filter.search.as_deref()))
            .bind(filter.include_deleted)
            .fetch_one(pool)
            .await
    }

    /// Live complaints by `student_id` created at or after `since`, newest first.
    ///
    /// Feeds the duplicate heuristic, which decides which of them match.
    pub async fn recent_for_student(
        pool: &PgPool,
        student_id: DbId,
        since: Timestamp,
    ) -> Result<Vec<Complaint>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM complaints
             WHERE student_id = $1 AND deleted_at IS NULL AND created_at >= $2
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Complaint>(&query)
            .bind(student_id)
            .bind(since)
            .fetch_all(pool)
            .await
    }
}
