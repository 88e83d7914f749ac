//! Handlers for the `/complaints` resource.
//!
//! Every mutation goes through [`ComplaintLifecycle`](crate::engine::ComplaintLifecycle);
//! the resulting outbox is handed to the notification dispatcher before the
//! response is written. The mutation has committed by then, so delivery
//! failures are logged and the response still reports success.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use hostel_core::complaint::ComplaintStatus;
use hostel_core::lifecycle::{ApprovalAction, ApprovalDecision, CostUpdate, StatusChange};
use hostel_core::types::DbId;
use hostel_db::models::complaint::ComplaintResponse;
use hostel_db::models::complaint_version::ComplaintVersion;
use serde::Deserialize;
use serde_json::Value;

use crate::engine::lifecycle::{ComplaintEdit, DuplicateCheck, ListQuery, NewComplaint};
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireStudent};
use crate::query::{ComplaintListParams, DuplicateCheckParams};
use crate::response::{ApiResponse, PagedResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /complaints`.
#[derive(Debug, Deserialize)]
pub struct CreateComplaintRequest {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub priority: Option<String>,
    /// References returned by `POST /uploads`.
    #[serde(default)]
    pub images: Vec<String>,
}

/// Request body for `PUT /complaints/{id}` (student edit).
#[derive(Debug, Deserialize)]
pub struct UpdateComplaintRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
}

/// Request body for `PUT /complaints/{id}/status`.
///
/// `status` and the approval `action` stay strings so unknown values surface
/// as validation errors rather than body rejections.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
    #[serde(alias = "adminNotes")]
    pub admin_notes: Option<String>,
    #[serde(alias = "estimatedCost")]
    pub estimated_cost: Option<f64>,
    #[serde(alias = "actualCost")]
    pub actual_cost: Option<f64>,
    #[serde(alias = "estimatedDays")]
    pub estimated_days: Option<i32>,
}

/// Request body for `PUT /complaints/{id}/cost`.
#[derive(Debug, Deserialize)]
pub struct CostUpdateRequest {
    #[serde(alias = "estimatedCost")]
    pub estimated_cost: Option<f64>,
    #[serde(alias = "actualCost")]
    pub actual_cost: Option<f64>,
}

/// Request body for `PUT /complaints/{id}/approve`.
#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub action: String,
    #[serde(alias = "rejectionReason")]
    pub rejection_reason: Option<String>,
}

/// Request body for `POST /complaints/{id}/feedback`.
///
/// `rating` stays raw JSON: numbers and numeric strings are both accepted
/// and checked by the lifecycle rules.
#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub rating: Value,
    pub feedback: Option<String>,
}

// ---------------------------------------------------------------------------
// Student operations
// ---------------------------------------------------------------------------

/// POST /api/v1/complaints
pub async fn create_complaint(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateComplaintRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ComplaintResponse>>)> {
    let outcome = state
        .lifecycle
        .create(
            &user.actor(),
            NewComplaint {
                title: input.title,
                description: input.description,
                category: input.category,
                priority: input.priority,
                images: input.images,
            },
        )
        .await?;
    state.dispatcher.dispatch_committed(outcome.outbox).await;

    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::ok(ComplaintResponse::from(outcome.value))
                .with_message("Complaint created successfully"),
        ),
    ))
}

/// GET /api/v1/complaints/check-duplicate?title=&description=
pub async fn check_duplicate(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<DuplicateCheckParams>,
) -> AppResult<Json<ApiResponse<DuplicateCheck>>> {
    let check = state
        .lifecycle
        .check_duplicate(&user.actor(), &params.title, &params.description)
        .await?;
    Ok(Json(ApiResponse::ok(check)))
}

/// PUT /api/v1/complaints/{id}
pub async fn update_complaint(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateComplaintRequest>,
) -> AppResult<Json<ApiResponse<ComplaintResponse>>> {
    let complaint = state
        .lifecycle
        .update(
            id,
            ComplaintEdit {
                title: input.title,
                description: input.description,
                category: input.category,
                priority: input.priority,
            },
            &user.actor(),
        )
        .await?;
    Ok(Json(
        ApiResponse::ok(ComplaintResponse::from(complaint))
            .with_message("Complaint updated successfully"),
    ))
}

/// POST /api/v1/complaints/{id}/feedback
pub async fn submit_feedback(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<FeedbackRequest>,
) -> AppResult<Json<ApiResponse<ComplaintResponse>>> {
    let complaint = state
        .lifecycle
        .submit_feedback(id, &input.rating, input.feedback.as_deref(), &user.actor())
        .await?;
    Ok(Json(
        ApiResponse::ok(ComplaintResponse::from(complaint))
            .with_message("Feedback submitted successfully"),
    ))
}

// ---------------------------------------------------------------------------
// Shared reads and deletion
// ---------------------------------------------------------------------------

/// GET /api/v1/complaints
pub async fn list_complaints(
    auth: AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ComplaintListParams>,
) -> AppResult<Json<PagedResponse<ComplaintResponse>>> {
    let pagination = params.pagination();
    let page = state
        .lifecycle
        .list(
            ListQuery {
                status: params.status,
                search: params.search,
                sort_by: params.sort_by,
                include_deleted: params.include_deleted,
                pagination,
            },
            &auth.actor(),
        )
        .await?;

    let items = page.items.into_iter().map(ComplaintResponse::from).collect();
    Ok(Json(PagedResponse::new(items, page.meta)))
}

/// GET /api/v1/complaints/{id}
pub async fn get_complaint(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<ComplaintResponse>>> {
    let complaint = state.lifecycle.get(id, &auth.actor()).await?;
    Ok(Json(ApiResponse::ok(ComplaintResponse::from(complaint))))
}

/// GET /api/v1/complaints/{id}/versions
pub async fn list_versions(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<Vec<ComplaintVersion>>>> {
    let versions = state.lifecycle.versions(id, &auth.actor()).await?;
    Ok(Json(ApiResponse::ok(versions)))
}

/// DELETE /api/v1/complaints/{id}
///
/// Owners may delete in any status; admins only once resolved.
pub async fn delete_complaint(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let outcome = state.lifecycle.soft_delete(id, &auth.actor()).await?;
    state.dispatcher.dispatch_committed(outcome.outbox).await;
    Ok(Json(
        ApiResponse::ok(serde_json::json!({ "complaint_id": id }))
            .with_message("Complaint deleted successfully"),
    ))
}

// ---------------------------------------------------------------------------
// Admin operations
// ---------------------------------------------------------------------------

/// PUT /api/v1/complaints/{id}/status
pub async fn update_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<StatusUpdateRequest>,
) -> AppResult<Json<ApiResponse<ComplaintResponse>>> {
    let change = StatusChange {
        status: ComplaintStatus::parse(input.status.trim())?,
        admin_notes: input.admin_notes,
        estimated_cost: input.estimated_cost,
        actual_cost: input.actual_cost,
        estimated_days: input.estimated_days,
    };
    let outcome = state
        .lifecycle
        .transition(id, change, &admin.actor())
        .await?;
    state.dispatcher.dispatch_committed(outcome.outbox).await;

    Ok(Json(
        ApiResponse::ok(ComplaintResponse::from(outcome.value))
            .with_message("Complaint status updated successfully"),
    ))
}

/// PUT /api/v1/complaints/{id}/cost
pub async fn update_cost(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<CostUpdateRequest>,
) -> AppResult<Json<ApiResponse<ComplaintResponse>>> {
    let update = CostUpdate {
        estimated_cost: input.estimated_cost,
        actual_cost: input.actual_cost,
    };
    let outcome = state
        .lifecycle
        .update_cost(id, update, &admin.actor())
        .await?;
    state.dispatcher.dispatch_committed(outcome.outbox).await;

    Ok(Json(
        ApiResponse::ok(ComplaintResponse::from(outcome.value)).with_message("Cost updated"),
    ))
}

/// PUT /api/v1/complaints/{id}/approve
pub async fn approve_complaint(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<ApprovalRequest>,
) -> AppResult<Json<ApiResponse<ComplaintResponse>>> {
    let action = ApprovalAction::parse(input.action.trim())?;
    let decision = ApprovalDecision {
        action,
        rejection_reason: input.rejection_reason,
    };
    let outcome = state
        .lifecycle
        .approve(id, decision, &admin.actor())
        .await?;
    state.dispatcher.dispatch_committed(outcome.outbox).await;

    Ok(Json(
        ApiResponse::ok(ComplaintResponse::from(outcome.value))
            .with_message(format!("Complaint {action}")),
    ))
}

/// POST /api/v1/complaints/{id}/restore
pub async fn restore_complaint(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<ApiResponse<ComplaintResponse>>> {
    let complaint = state.lifecycle.restore(id, &admin.actor()).await?;
    Ok(Json(
        ApiResponse::ok(ComplaintResponse::from(complaint))
            .with_message("Complaint restored successfully"),
    ))
}
