pub mod analytics;
pub mod auth;
pub mod complaint;
pub mod feature_toggle;
pub mod health;
pub mod notification;
pub mod upload;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws?token=                                       WebSocket (token in query)
///
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/me                                         current user
///
/// /uploads                                         image upload (POST, multipart)
///
/// /complaints                                      list, create
/// /complaints/check-duplicate                      duplicate preview (student)
/// /complaints/{id}                                 get, update, delete
/// /complaints/{id}/versions                        version history
/// /complaints/{id}/feedback                        resolution rating (student)
/// /complaints/{id}/status                          status change (admin)
/// /complaints/{id}/cost                            cost update (admin)
/// /complaints/{id}/approve                         approval decision (admin)
/// /complaints/{id}/restore                         undo soft delete (admin)
///
/// /notifications                                   list with unread count
/// /notifications/read-all                          mark all read (PUT)
/// /notifications/{id}/read                         mark one read (PUT)
/// /notifications/{id}                              delete
///
/// /feature-toggles                                 list
/// /feature-toggles/{key}                           get, update (admin)
///
/// /analytics/summary                               dashboard summary (admin)
/// /analytics/statistics                            chart data (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // WebSocket endpoint.
        .route("/ws", get(ws::ws_handler))
        .nest("/auth", auth::router())
        .nest("/uploads", upload::router())
        .nest("/complaints", complaint::router())
        .nest("/notifications", notification::router())
        .nest("/feature-toggles", feature_toggle::router())
        .nest("/analytics", analytics::router())
}
