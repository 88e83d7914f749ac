//! HTTP-level integration tests for feature toggles and admin analytics.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_complaint, get_auth, post_json_auth, put_json_auth, register_admin,
    register_student,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Feature toggles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn seeded_toggle_is_listed_and_readable(pool: PgPool) {
    let app = common::build_test_app(pool);
    let student = register_student(&app, "asha").await;

    let response = get_auth(app.clone(), "/api/v1/feature-toggles", &student.token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let toggles = body_json(response).await["data"].clone();
    assert!(toggles
        .as_array()
        .unwrap()
        .iter()
        .any(|t| t["key"] == "duplicate_detection" && t["enabled"] == true));

    let response = get_auth(
        app.clone(),
        "/api/v1/feature-toggles/duplicate_detection",
        &student.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["enabled"], true);

    let response =
        get_auth(app.clone(), "/api/v1/feature-toggles/unknown_toggle", &student.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(app, "/api/v1/feature-toggles/Bad-Key", &student.token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_admins_flip_toggles(pool: PgPool) {
    let app = common::build_test_app(pool);
    let student = register_student(&app, "bina").await;
    let admin = register_admin(&app, "warden").await;
    let uri = "/api/v1/feature-toggles/duplicate_detection";

    let response =
        put_json_auth(app.clone(), uri, json!({ "enabled": false }), &student.token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = put_json_auth(app.clone(), uri, json!({ "enabled": false }), &admin.token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["enabled"], false);

    // An empty body switches it back on.
    let response = put_json_auth(app.clone(), uri, json!({}), &admin.token).await;
    assert_eq!(body_json(response).await["data"]["enabled"], true);

    let response = put_json_auth(
        app,
        "/api/v1/feature-toggles/unknown_toggle",
        json!({ "enabled": true }),
        &admin.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_database_yields_zero_summary(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = register_admin(&app, "warden").await;

    let response = get_auth(app, "/api/v1/analytics/summary", &admin.token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["total_complaints"], 0);
    assert_eq!(data["average_resolution_time"], 0);
    assert!(data["average_resolution_rating"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn summary_and_statistics_reflect_live_complaints(pool: PgPool) {
    let app = common::build_test_app(pool);
    let student = register_student(&app, "chetan").await;
    let admin = register_admin(&app, "warden").await;

    let urgent = post_json_auth(
        app.clone(),
        "/api/v1/complaints",
        json!({
            "title": "Gas leak smell in kitchen",
            "description": "There is a strong smell of gas near the mess kitchen.",
            "category": "food",
            "priority": "high",
        }),
        &student.token,
    )
    .await;
    assert_eq!(urgent.status(), StatusCode::CREATED);

    let resolved = create_complaint(
        &app,
        &student.token,
        "Torn curtain in lounge",
        "One of the lounge curtains is torn down the middle.",
    )
    .await;
    let resolved_id = resolved["id"].as_i64().unwrap();
    put_json_auth(
        app.clone(),
        &format!("/api/v1/complaints/{resolved_id}/status"),
        json!({ "status": "resolved" }),
        &admin.token,
    )
    .await;
    post_json_auth(
        app.clone(),
        &format!("/api/v1/complaints/{resolved_id}/feedback"),
        json!({ "rating": 4 }),
        &student.token,
    )
    .await;

    // Deleted complaints are left out of every figure.
    let deleted = create_complaint(
        &app,
        &student.token,
        "Squeaky door hinge",
        "The door to room 30 squeaks loudly every time it opens.",
    )
    .await;
    common::delete_auth(
        app.clone(),
        &format!("/api/v1/complaints/{}", deleted["id"]),
        &student.token,
    )
    .await;

    let response = get_auth(app.clone(), "/api/v1/analytics/summary", &admin.token).await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["total_complaints"], 2);
    assert_eq!(data["resolved_complaints"], 1);
    assert_eq!(data["active_complaints"], 1);
    assert_eq!(data["high_priority_complaints"], 1);
    assert_eq!(data["average_resolution_rating"], 4.0);
    assert_eq!(data["average_resolution_time"], 0);

    let response = get_auth(app, "/api/v1/analytics/statistics", &admin.token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["stats"]["total"], 2);
    assert_eq!(data["stats"]["pending"], 1);
    assert_eq!(data["stats"]["resolved"], 1);

    let trend = data["status_trend"].as_array().unwrap();
    assert_eq!(trend.len(), 7);
    let today = &trend[6];
    assert_eq!(today["total"], 2);
    assert_eq!(today["resolved"], 1);

    let categories = data["category_distribution"].as_array().unwrap();
    assert!(categories.iter().any(|b| b["name"] == "food" && b["value"] == 1));
}
