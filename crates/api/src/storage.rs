//! Local-disk [`BlobStore`] for uploaded complaint images.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use hostel_core::error::CoreError;
use hostel_core::storage::{validate_upload_size, BlobStore, UPLOAD_URL_PREFIX};
use image::ImageFormat;

/// Writes blobs under `root` with random names.
///
/// The router serves `root` at `/uploads`, so the returned references are
/// directly fetchable.
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Sniff the image format from its magic bytes. Only PNG, JPEG and WEBP pass.
pub fn sniff_extension(bytes: &[u8]) -> Result<&'static str, CoreError> {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => Ok("png"),
        Ok(ImageFormat::Jpeg) => Ok("jpg"),
        Ok(ImageFormat::WebP) => Ok("webp"),
        _ => Err(CoreError::Validation(
            "Only PNG, JPEG and WEBP images are allowed".into(),
        )),
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, original_name: Option<&str>, bytes: &[u8]) -> Result<String, CoreError> {
        validate_upload_size(bytes.len())?;
        let extension = sniff_extension(bytes)?;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| CoreError::Storage(format!("create uploads dir: {e}")))?;

        let name = format!("{}.{extension}", uuid::Uuid::new_v4());
        let path = self.root.join(&name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| CoreError::Storage(format!("write upload: {e}")))?;

        tracing::info!(
            original_name = original_name.unwrap_or(""),
            stored_as = %name,
            size = bytes.len(),
            "Image uploaded"
        );
        Ok(format!("{UPLOAD_URL_PREFIX}{name}"))
    }
}
