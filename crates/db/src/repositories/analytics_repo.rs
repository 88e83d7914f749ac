//! Read-only rollups over live (non-deleted) complaints.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::models::analytics::{DailyStatusRow, GroupCount};

/// Columns that [`AnalyticsRepo::count_by`] may group on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupColumn {
    Category,
    Status,
    Priority,
}

impl GroupColumn {
    fn column(self) -> &'static str {
        match self {
            GroupColumn::Category => "category",
            GroupColumn::Status => "status",
            GroupColumn::Priority => "priority",
        }
    }
}

pub struct AnalyticsRepo;

impl AnalyticsRepo {
    /// Complaint counts grouped by one enumerated column, ordered by name.
    pub async fn count_by(
        pool: &PgPool,
        group: GroupColumn,
    ) -> Result<Vec<GroupCount>, sqlx::Error> {
        let column = group.column();
        let query = format!(
            "SELECT {column} AS name, COUNT(*) AS value FROM complaints
             WHERE deleted_at IS NULL
             GROUP BY {column}
             ORDER BY {column}"
        );
        sqlx::query_as::<_, GroupCount>(&query).fetch_all(pool).await
    }

    /// High-priority complaints that are not yet resolved.
    pub async fn high_priority_unresolved(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM complaints \
             WHERE deleted_at IS NULL AND priority = 'high' AND status <> 'resolved'",
        )
        .fetch_one(pool)
        .await
    }

    /// Mean `resolved_at - created_at` in seconds over complaints ever resolved.
    pub async fn average_resolution_seconds(pool: &PgPool) -> Result<Option<f64>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT AVG(EXTRACT(EPOCH FROM (resolved_at - created_at)))::DOUBLE PRECISION \
             FROM complaints \
             WHERE deleted_at IS NULL AND resolved_at IS NOT NULL",
        )
        .fetch_one(pool)
        .await
    }

    /// Mean rating over resolved, rated complaints.
    pub async fn average_rating(pool: &PgPool) -> Result<Option<f64>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT AVG(resolution_rating)::DOUBLE PRECISION FROM complaints \
             WHERE deleted_at IS NULL AND status = 'resolved' AND resolution_rating IS NOT NULL",
        )
        .fetch_one(pool)
        .await
    }

    /// Complaints created on or after `since` (UTC days), grouped by day and status.
    pub async fn daily_status_counts(
        pool: &PgPool,
        since: NaiveDate,
    ) -> Result<Vec<DailyStatusRow>, sqlx::Error> {
        sqlx::query_as::<_, DailyStatusRow>(
            "SELECT (created_at AT TIME ZONE 'UTC')::DATE AS day, status, COUNT(*) AS count \
             FROM complaints \
             WHERE deleted_at IS NULL AND (created_at AT TIME ZONE 'UTC')::DATE >= $1 \
             GROUP BY 1, 2 \
             ORDER BY 1",
        )
        .bind(since)
        .fetch_all(pool)
        .await
    }
}
