//! Liveness endpoint for the complaint service, mounted outside `/api/v1`.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use hostel_core::outbox::Room;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when PostgreSQL is unreachable. Complaints cannot
    /// be filed or moved through their lifecycle in that state.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    pub ws_connections: usize,
    /// Connections joined to the admin room, i.e. wardens watching the
    /// live complaint feed.
    pub admin_listeners: usize,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = hostel_db::health_check(&state.pool).await.is_ok();
    let status = if db_healthy { "ok" } else { "degraded" };
    let admin_room = Room::Admin.to_string();

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        ws_connections: state.ws_manager.connection_count().await,
        admin_listeners: state.ws_manager.room_size(&admin_room).await,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
