//! Image upload handler.
//!
//! Files are checked in full before any of them is written, so a rejected
//! request leaves nothing behind in the uploads directory.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use hostel_core::storage::{validate_upload_count, validate_upload_size};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::storage::sniff_extension;

/// Multipart field carrying image files.
const IMAGES_FIELD: &str = "images";

#[derive(Debug, Serialize)]
pub struct UploadedImages {
    pub images: Vec<String>,
}

/// POST /api/v1/uploads
///
/// Accepts up to five `images` parts and returns their references, ready to
/// be sent as the `images` array of a new complaint.
pub async fn upload_images(
    auth: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<UploadedImages>>)> {
    let mut files: Vec<(Option<String>, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(IMAGES_FIELD) {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        files.push((filename, data.to_vec()));
        validate_upload_count(files.len())?;
    }

    validate_upload_count(files.len())?;
    for (_, data) in &files {
        validate_upload_size(data.len())?;
        sniff_extension(data)?;
    }

    let mut images = Vec::with_capacity(files.len());
    for (filename, data) in &files {
        images.push(state.blob_store.put(filename.as_deref(), data).await?);
    }

    tracing::info!(user_id = auth.user_id, count = images.len(), "Images uploaded");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(UploadedImages { images }).with_message("Images uploaded")),
    ))
}
