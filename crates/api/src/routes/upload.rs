//! Route definitions for `/uploads`.

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use hostel_core::storage::{MAX_UPLOAD_BYTES, MAX_UPLOAD_FILES};

use crate::handlers::upload;
use crate::state::AppState;

/// Room for the multipart framing around a full batch of images.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// ```text
/// POST / -> upload_images (multipart, field `images`)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(upload::upload_images))
        .layer(DefaultBodyLimit::max(
            MAX_UPLOAD_BYTES * MAX_UPLOAD_FILES + MULTIPART_OVERHEAD_BYTES,
        ))
}
