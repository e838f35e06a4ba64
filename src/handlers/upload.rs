// src/handlers/upload.rs

use axum::{
    Json,
    extract::{Multipart, State},
    response::IntoResponse,
};
use serde_json::json;

use crate::error::AppError;
use crate::upload::{UploadError, UploadPolicy};

/// Stores a single multipart `media` file and returns its public URL.
/// The policy rejects disallowed MIME types and oversize files before
/// anything reaches disk.
pub async fn upload_media(
    State(uploads): State<UploadPolicy>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some("media") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let mime = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?;

        let url = uploads.store(&filename, &mime, &data).await?;
        tracing::info!(%url, size = data.len(), "Media uploaded");

        return Ok(Json(json!({ "url": url })));
    }

    Err(UploadError::MissingFile.into())
}
