#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use hostel_api::auth::jwt::JwtConfig;
use hostel_api::config::ServerConfig;
use hostel_api::router::build_app_router;
use hostel_api::state::AppState;
use hostel_api::ws::WsManager;
use hostel_events::EventBus;

/// Build a test `ServerConfig` with safe defaults.
///
/// Admin self-registration is enabled so tests can create admins through the
/// API, and uploads land in a fresh directory under the system temp dir.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        store_timeout_secs: 5,
        feature_toggle_ttl_secs: 30,
        uploads_dir: std::env::temp_dir().join(format!("hostel-uploads-{}", uuid::Uuid::new_v4())),
        allow_admin_registration: true,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            expiry_days: 7,
        },
    }
}

/// Assemble the application state the same way `main.rs` does.
pub fn test_state(pool: PgPool) -> AppState {
    AppState::new(
        pool,
        test_config(),
        Arc::new(WsManager::new()),
        Arc::new(EventBus::default()),
    )
}

/// Build the full application router with all middleware layers.
pub fn build_test_app(pool: PgPool) -> Router {
    router_for(test_state(pool))
}

/// Build the router over an existing state, e.g. one whose event bus the test
/// has already subscribed to.
pub fn router_for(state: AppState) -> Router {
    let config = (*state.config).clone();
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// An account created through `POST /auth/register`.
pub struct TestUser {
    pub id: i64,
    pub token: String,
}

pub async fn register(app: &Router, name: &str, email: &str, role: &str) -> TestUser {
    let body = json!({
        "name": name,
        "email": email,
        "password": "secret123",
        "role": role,
        "room_number": "B-204",
        "hostel": "North Block",
    });
    let response = post_json(app.clone(), "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    TestUser {
        id: json["data"]["user"]["id"].as_i64().unwrap(),
        token: json["data"]["token"].as_str().unwrap().to_string(),
    }
}

pub async fn register_student(app: &Router, name: &str) -> TestUser {
    register(app, name, &format!("{name}@hostel.test"), "student").await
}

pub async fn register_admin(app: &Router, name: &str) -> TestUser {
    register(app, name, &format!("{name}@hostel.test"), "admin").await
}

/// File a complaint and return its JSON representation.
pub async fn create_complaint(app: &Router, token: &str, title: &str, description: &str) -> Value {
    let body = json!({
        "title": title,
        "description": description,
        "category": "plumbing",
        "priority": "medium",
    });
    let response = post_json_auth(app.clone(), "/api/v1/complaints", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}
