//! Notification entity model.

use hostel_core::outbox::{NotificationKind, NotificationPriority};
use hostel_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub complaint_id: Option<DbId>,
    pub message: String,
    #[sqlx(try_from = "String")]
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[sqlx(try_from = "String")]
    pub priority: NotificationPriority,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
