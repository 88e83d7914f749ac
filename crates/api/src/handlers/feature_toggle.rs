//! Handlers for the `/feature-toggles` resource.
//!
//! Reads are open to any authenticated user; flipping a toggle is admin-only
//! and drops the cached snapshot so the change applies to the next request.

use axum::extract::State;
use axum::Json;
use hostel_core::feature_toggle::validate_toggle_key;
use hostel_db::models::feature_toggle::{FeatureToggle, UpdateFeatureToggle};
use hostel_db::repositories::FeatureToggleRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::ApiResponse;
use crate::state::AppState;

fn toggle_not_found(key: &str) -> AppError {
    AppError::NotFound(format!("Feature toggle '{key}' not found"))
}

/// GET /api/v1/feature-toggles
pub async fn list_toggles(
    _auth: RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<FeatureToggle>>>> {
    let toggles = FeatureToggleRepo::list(&state.pool).await?;
    Ok(Json(ApiResponse::ok(toggles)))
}

/// GET /api/v1/feature-toggles/{key}
pub async fn get_toggle(
    _auth: RequireAuth,
    State(state): State<AppState>,
    AppPath(key): AppPath<String>,
) -> AppResult<Json<ApiResponse<FeatureToggle>>> {
    validate_toggle_key(&key)?;
    let toggle = FeatureToggleRepo::find_by_key(&state.pool, &key)
        .await?
        .ok_or_else(|| toggle_not_found(&key))?;
    Ok(Json(ApiResponse::ok(toggle)))
}

/// PUT /api/v1/feature-toggles/{key}
///
/// A body without `enabled` switches the toggle on.
pub async fn update_toggle(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(key): AppPath<String>,
    AppJson(input): AppJson<UpdateFeatureToggle>,
) -> AppResult<Json<ApiResponse<FeatureToggle>>> {
    validate_toggle_key(&key)?;
    let enabled = input.enabled.unwrap_or(true);

    let toggle = FeatureToggleRepo::set_enabled(&state.pool, &key, enabled)
        .await?
        .ok_or_else(|| toggle_not_found(&key))?;
    state.feature_gate.invalidate().await;

    tracing::info!(key = %key, enabled, admin_id = admin.user_id, "Feature toggle updated");
    Ok(Json(
        ApiResponse::ok(toggle).with_message(format!("Feature toggle '{key}' updated")),
    ))
}
