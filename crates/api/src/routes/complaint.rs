//! Route definitions for the `/complaints` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::complaint;
use crate::state::AppState;

/// Routes mounted at `/complaints`.
///
/// ```text
/// GET    /                   -> list_complaints (any; students see their own)
/// POST   /                   -> create_complaint (student)
/// GET    /check-duplicate    -> check_duplicate (student)
/// GET    /{id}               -> get_complaint (owner or admin)
/// PUT    /{id}               -> update_complaint (owner, while pending)
/// DELETE /{id}               -> delete_complaint (owner, or admin once resolved)
/// GET    /{id}/versions      -> list_versions (owner or admin)
/// POST   /{id}/feedback      -> submit_feedback (owner, once resolved)
/// PUT    /{id}/status        -> update_status (admin)
/// PUT    /{id}/cost          -> update_cost (admin)
/// PUT    /{id}/approve       -> approve_complaint (admin)
/// POST   /{id}/restore       -> restore_complaint (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(complaint::list_complaints).post(complaint::create_complaint),
        )
        .route("/check-duplicate", get(complaint::check_duplicate))
        .route(
            "/{id}",
            get(complaint::get_complaint)
                .put(complaint::update_complaint)
                .delete(complaint::delete_complaint),
        )
        .route("/{id}/versions", get(complaint::list_versions))
        .route("/{id}/feedback", post(complaint::submit_feedback))
        // Admin workflow
        .route("/{id}/status", put(complaint::update_status))
        .route("/{id}/cost", put(complaint::update_cost))
        .route("/{id}/approve", put(complaint::approve_complaint))
        .route("/{id}/restore", post(complaint::restore_complaint))
}
