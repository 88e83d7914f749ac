//! Route definitions for the `/feature-toggles` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::feature_toggle;
use crate::state::AppState;

/// Routes mounted at `/feature-toggles`.
///
/// ```text
/// GET /        -> list_toggles
/// GET /{key}   -> get_toggle
/// PUT /{key}   -> update_toggle (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(feature_toggle::list_toggles))
        .route(
            "/{key}",
            get(feature_toggle::get_toggle).put(feature_toggle::update_toggle),
        )
}
