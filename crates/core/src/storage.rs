use async_trait::async_trait;

use crate::error::CoreError;

/// Largest accepted upload, per file.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Files accepted per upload request.
pub const MAX_UPLOAD_FILES: usize = 5;

/// Public path prefix under which stored blobs are served.
pub const UPLOAD_URL_PREFIX: &str = "/uploads/";

/// Stores uploaded images and hands back a stable reference.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist `bytes` and return the public reference (e.g. `/uploads/<name>`).
    async fn put(&self, original_name: Option<&str>, bytes: &[u8]) -> Result<String, CoreError>;
}

pub fn validate_upload_size(len: usize) -> Result<(), CoreError> {
    if len == 0 {
        return Err(CoreError::Validation("Uploaded file is empty".into()));
    }
    if len > MAX_UPLOAD_BYTES {
        return Err(CoreError::Validation(format!(
            "Uploaded file exceeds the {} MiB limit",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

pub fn validate_upload_count(count: usize) -> Result<(), CoreError> {
    if count == 0 {
        return Err(CoreError::Validation("No images uploaded".into()));
    }
    if count > MAX_UPLOAD_FILES {
        return Err(CoreError::Validation(format!(
            "At most {MAX_UPLOAD_FILES} images may be uploaded at once"
        )));
    }
    Ok(())
}
