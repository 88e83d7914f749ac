//! Row shapes for grouped analytics queries.

use chrono::NaiveDate;
use hostel_core::analytics::{Bucket, DailyStatusCount};
use hostel_core::complaint::ComplaintStatus;
use sqlx::FromRow;

/// `SELECT <column> AS name, COUNT(*) AS value ... GROUP BY 1`.
#[derive(Debug, Clone, FromRow)]
pub struct GroupCount {
    pub name: String,
    pub value: i64,
}

impl From<GroupCount> for Bucket {
    fn from(row: GroupCount) -> Self {
        Bucket {
            name: row.name,
            value: row.value,
        }
    }
}

/// Complaints created on a UTC day, grouped by current status.
#[derive(Debug, Clone, FromRow)]
pub struct DailyStatusRow {
    pub day: NaiveDate,
    #[sqlx(try_from = "String")]
    pub status: ComplaintStatus,
    pub count: i64,
}

impl From<DailyStatusRow> for DailyStatusCount {
    fn from(row: DailyStatusRow) -> Self {
        DailyStatusCount {
            day: row.day,
            status: row.status,
            count: row.count,
        }
    }
}
