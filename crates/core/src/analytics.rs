//! Read-only complaint rollups.
//!
//! The database layer produces raw grouped counts; the functions here shape
//! them into the summary and statistics payloads.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::complaint::ComplaintStatus;

/// Days covered by the created-per-day trend, including today.
pub const TREND_DAYS: i64 = 7;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// One group of a distribution, e.g. `{ "name": "plumbing", "value": 4 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub resolved: i64,
}

impl StatusCounts {
    pub fn from_buckets(buckets: &[Bucket]) -> Self {
        let mut counts = Self::default();
        for bucket in buckets {
            counts.add(ComplaintStatus::parse(&bucket.name).ok(), bucket.value);
        }
        counts
    }

    fn add(&mut self, status: Option<ComplaintStatus>, count: i64) {
        self.total += count;
        match status {
            Some(ComplaintStatus::Pending) => self.pending += count,
            Some(ComplaintStatus::InProgress) => self.in_progress += count,
            Some(ComplaintStatus::Resolved) => self.resolved += count,
            None => {}
        }
    }
}

/// Complaints created on one day with a given current status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyStatusCount {
    pub day: NaiveDate,
    pub status: ComplaintStatus,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub counts: StatusCounts,
}

/// First day included in the trend ending at `today`.
pub fn trend_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(TREND_DAYS - 1)
}

/// One point per day for the last [`TREND_DAYS`] days, oldest first.
/// Days without complaints are reported with zero counts.
pub fn status_trend(today: NaiveDate, rows: &[DailyStatusCount]) -> Vec<TrendPoint> {
    let start = trend_start(today);
    (0..TREND_DAYS)
        .map(|offset| {
            let date = start + Duration::days(offset);
            let mut counts = StatusCounts::default();
            for row in rows.iter().filter(|r| r.day == date) {
                counts.add(Some(row.status), row.count);
            }
            TrendPoint { date, counts }
        })
        .collect()
}

/// Average resolution time in whole days, rounded; `0` when nothing resolved.
pub fn average_resolution_days(avg_seconds: Option<f64>) -> i64 {
    avg_seconds
        .filter(|s| s.is_finite())
        .map(|s| (s / SECONDS_PER_DAY).round() as i64)
        .unwrap_or(0)
}

/// Average rating rounded to two decimals.
pub fn round_rating(avg: Option<f64>) -> Option<f64> {
    avg.filter(|v| v.is_finite())
        .map(|v| (v * 100.0).round() / 100.0)
}

/// Admin dashboard summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    pub total_complaints: i64,
    pub resolved_complaints: i64,
    pub active_complaints: i64,
    pub high_priority_complaints: i64,
    pub complaints_by_category: Vec<Bucket>,
    pub complaints_by_status: Vec<Bucket>,
    pub complaints_by_priority: Vec<Bucket>,
    pub average_resolution_time: i64,
    pub average_resolution_rating: Option<f64>,
}

impl AnalyticsSummary {
    pub fn build(
        by_category: Vec<Bucket>,
        by_status: Vec<Bucket>,
        by_priority: Vec<Bucket>,
        high_priority_unresolved: i64,
        avg_resolution_seconds: Option<f64>,
        avg_rating: Option<f64>,
    ) -> Self {
        let counts = StatusCounts::from_buckets(&by_status);
        Self {
            total_complaints: counts.total,
            resolved_complaints: counts.resolved,
            active_complaints: counts.pending + counts.in_progress,
            high_priority_complaints: high_priority_unresolved,
            complaints_by_category: by_category,
            complaints_by_status: by_status,
            complaints_by_priority: by_priority,
            average_resolution_time: average_resolution_days(avg_resolution_seconds),
            average_resolution_rating: round_rating(avg_rating),
        }
    }
}

/// Chart-oriented statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub stats: StatusCounts,
    pub category_distribution: Vec<Bucket>,
    pub priority_distribution: Vec<Bucket>,
    pub status_trend: Vec<TrendPoint>,
    pub avg_resolution_time: i64,
}
