//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server needed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use http_body_util::BodyExt;
use hostel_api::error::AppError;
use hostel_core::complaint::ComplaintStatus;
use hostel_core::duplicate_detection::{DuplicateCandidate, DuplicateConflict};
use hostel_core::error::CoreError;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Complaint",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Complaint with id 42 not found");
}

#[tokio::test]
async fn keyed_not_found_returns_404() {
    let (status, json) =
        error_to_response(AppError::NotFound("Feature toggle 'x' not found".into())).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Feature toggle 'x' not found");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let err =
        AppError::Core(CoreError::Validation("Title must be between 5 and 100 characters".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Title must be between 5 and 100 characters");
}

#[tokio::test]
async fn auth_errors_map_to_401_and_403() {
    let err = AppError::Core(CoreError::Unauthorized("Invalid credentials".into()));
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");

    let err = AppError::Core(CoreError::Forbidden("Admin access required".into()));
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn duplicate_returns_409_with_candidates() {
    let conflict = DuplicateConflict::from_candidates(vec![DuplicateCandidate {
        id: 17,
        title: "Leaking tap".into(),
        status: ComplaintStatus::Pending,
        created_at: Utc::now(),
    }])
    .unwrap();

    let (status, json) = error_to_response(AppError::Core(CoreError::Duplicate(conflict))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "DUPLICATE_COMPLAINT");
    assert_eq!(json["possible_duplicate_id"], 17);
    assert_eq!(json["similar_complaints"][0]["title"], "Leaking tap");
    assert_eq!(json["similar_complaints"][0]["status"], "pending");
}

#[tokio::test]
async fn storage_error_hides_details() {
    let err = AppError::Core(CoreError::Storage("insert complaint timed out".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "STORAGE_ERROR");
    assert!(!json["error"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn pool_timeout_is_a_storage_error() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::PoolTimedOut)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "STORAGE_ERROR");
}

#[tokio::test]
async fn internal_error_hides_details() {
    let err = AppError::InternalError("secret database password leaked".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}
