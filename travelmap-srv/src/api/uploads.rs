//! Image upload endpoint
//!
//! Clients upload trip photos here first, then submit the returned URLs
//! as the record's `uploadedImages`.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::{ApiError, AppState};

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub urls: Vec<String>,
}

/// POST /api/uploads (multipart)
///
/// Stores each image part under the uploads directory with a generated
/// name and returns the ordered list of serving URLs.
pub async fn upload_images(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let mut urls = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed upload: {e}")))?
    {
        let file_name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            // Non-file form fields are ignored
            _ => continue,
        };

        let extension = Path::new(&file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ApiError::BadRequest(format!(
                "Only image files are allowed ({}), got: {file_name}",
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?;

        let stored_name = format!("{}.{extension}", Uuid::new_v4());
        tokio::fs::write(state.uploads_dir.join(&stored_name), &data).await?;
        urls.push(format!("/uploads/{stored_name}"));
    }

    if urls.is_empty() {
        return Err(ApiError::BadRequest("No image files in upload.".to_string()));
    }

    info!(count = urls.len(), "Stored uploaded images");
    Ok((StatusCode::CREATED, Json(UploadResponse { urls })))
}
