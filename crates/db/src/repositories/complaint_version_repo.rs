//! Repository for the append-only `complaint_versions` table.

use hostel_core::types::DbId;
use hostel_core::versioning::VersionEntry;
use sqlx::PgPool;

use crate::models::complaint_version::ComplaintVersion;
use crate::repositories::PgTx;

const COLUMNS: &str = "id, complaint_id, version, status, admin_notes, estimated_cost, \
    actual_cost, approval_status, changed_by, change_reason, created_at";

pub struct ComplaintVersionRepo;

impl ComplaintVersionRepo {
    /// Insert a snapshot within the transaction that updated the complaint.
    ///
    /// A second row for the same `(complaint_id, version)` violates
    /// `uq_complaint_versions_complaint_version`.
    pub async fn insert(
        tx: &mut PgTx<'_>,
        entry: &VersionEntry,
    ) -> Result<ComplaintVersion, sqlx::Error> {
        let query = format!(
            "INSERT INTO complaint_versions
                (complaint_id, version, status, admin_notes, estimated_cost, actual_cost,
                 approval_status, changed_by, change_reason)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ComplaintVersion>(&query)
            .bind(entry.complaint_id)
            .bind(entry.version)
            .bind(entry.snapshot.status.as_str())
            .bind(&entry.snapshot.admin_notes)
            .bind(entry.snapshot.estimated_cost)
            .bind(entry.snapshot.actual_cost)
            .bind(entry.snapshot.approval_status.as_str())
            .bind(entry.changed_by)
            .bind(&entry.change_reason)
            .fetch_one(&mut **tx)
            .await
    }

    /// All snapshots for a complaint, newest first.
    pub async fn list_for_complaint(
        pool: &PgPool,
        complaint_id: DbId,
    ) -> Result<Vec<ComplaintVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM complaint_versions
             WHERE complaint_id = $1
             ORDER BY version DESC"
        );
        sqlx::query_as::<_, ComplaintVersion>(&query)
            .bind(complaint_id)
            .fetch_all(pool)
            .await
    }
}
