//! Admin analytics handlers.
//!
//! Each endpoint runs a handful of grouped queries and hands the raw counts to
//! the builders in `hostel_core::analytics`.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use hostel_core::analytics::{
    average_resolution_days, status_trend, trend_start, AnalyticsSummary, Bucket,
    DailyStatusCount, Statistics, StatusCounts,
};
use hostel_db::repositories::analytics_repo::GroupColumn;
use hostel_db::repositories::AnalyticsRepo;
use hostel_db::DbPool;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

async fn buckets(pool: &DbPool, column: GroupColumn) -> AppResult<Vec<Bucket>> {
    let rows = AnalyticsRepo::count_by(pool, column).await?;
    Ok(rows.into_iter().map(Bucket::from).collect())
}

/// GET /api/v1/analytics/summary
pub async fn summary(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<AnalyticsSummary>>> {
    let pool = &state.pool;
    let by_category = buckets(pool, GroupColumn::Category).await?;
    let by_status = buckets(pool, GroupColumn::Status).await?;
    let by_priority = buckets(pool, GroupColumn::Priority).await?;
    let high_priority = AnalyticsRepo::high_priority_unresolved(pool).await?;
    let avg_seconds = AnalyticsRepo::average_resolution_seconds(pool).await?;
    let avg_rating = AnalyticsRepo::average_rating(pool).await?;

    Ok(Json(ApiResponse::ok(AnalyticsSummary::build(
        by_category,
        by_status,
        by_priority,
        high_priority,
        avg_seconds,
        avg_rating,
    ))))
}

/// GET /api/v1/analytics/statistics
pub async fn statistics(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Statistics>>> {
    let pool = &state.pool;
    let today = Utc::now().date_naive();

    let by_status = buckets(pool, GroupColumn::Status).await?;
    let category_distribution = buckets(pool, GroupColumn::Category).await?;
    let priority_distribution = buckets(pool, GroupColumn::Priority).await?;
    let daily: Vec<DailyStatusCount> = AnalyticsRepo::daily_status_counts(pool, trend_start(today))
        .await?
        .into_iter()
        .map(DailyStatusCount::from)
        .collect();
    let avg_seconds = AnalyticsRepo::average_resolution_seconds(pool).await?;

    Ok(Json(ApiResponse::ok(Statistics {
        stats: StatusCounts::from_buckets(&by_status),
        category_distribution,
        priority_distribution,
        status_trend: status_trend(today, &daily),
        avg_resolution_time: average_resolution_days(avg_seconds),
    })))
}
