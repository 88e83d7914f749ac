//! Handlers for the `/notifications` resource.
//!
//! All endpoints require authentication via [`AuthUser`] and only ever touch
//! the caller's own notifications.

use axum::extract::State;
use axum::Json;
use hostel_core::error::CoreError;
use hostel_core::types::DbId;
use hostel_db::models::notification::Notification;
use hostel_db::repositories::NotificationRepo;
use serde::Serialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::extract::AppPath;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Number of notifications returned by the listing.
const LIST_LIMIT: i64 = 50;

/// Response body for `GET /notifications`.
#[derive(Debug, Serialize)]
pub struct NotificationList {
    pub notifications: Vec<Notification>,
    pub unread_count: i64,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Notification",
        id,
    })
}

/// GET /api/v1/notifications
///
/// The caller's newest notifications plus their unread total.
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<NotificationList>>> {
    let notifications =
        NotificationRepo::list_for_user(&state.pool, auth.user_id, LIST_LIMIT).await?;
    let unread_count = NotificationRepo::unread_count(&state.pool, auth.user_id).await?;

    Ok(Json(ApiResponse::ok(NotificationList {
        notifications,
        unread_count,
    })))
}

/// PUT /api/v1/notifications/{id}/read
///
/// 404 if the notification does not belong to the caller.
pub async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(notification_id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<Notification>>> {
    let notification = NotificationRepo::mark_read(&state.pool, notification_id, auth.user_id)
        .await?
        .ok_or_else(|| not_found(notification_id))?;
    Ok(Json(ApiResponse::ok(notification)))
}

/// PUT /api/v1/notifications/read-all
pub async fn mark_all_read(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let updated = NotificationRepo::mark_all_read(&state.pool, auth.user_id).await?;
    tracing::debug!(user_id = auth.user_id, updated, "Notifications marked read");

    Ok(Json(
        ApiResponse::ok(json!({ "updated": updated }))
            .with_message("All notifications marked as read"),
    ))
}

/// DELETE /api/v1/notifications/{id}
pub async fn delete_notification(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(notification_id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let deleted = NotificationRepo::delete(&state.pool, notification_id, auth.user_id).await?;
    if !deleted {
        return Err(not_found(notification_id));
    }
    Ok(Json(
        ApiResponse::ok(json!({ "id": notification_id })).with_message("Notification deleted"),
    ))
}
