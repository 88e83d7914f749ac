//! Route definitions for `/analytics` (admin only).

use axum::routing::get;
use axum::Router;

use crate::handlers::analytics;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/summary", get(analytics::summary))
        .route("/statistics", get(analytics::statistics))
}
