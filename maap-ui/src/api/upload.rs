//! Upload forwarding handler

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Response for an accepted upload
#[derive(Debug, Serialize)]
pub struct UploadAccepted {
    pub status: String,
    /// Canonical filename assigned by the remote store; the identifier to
    /// watch for
    #[serde(rename = "fileName")]
    pub file_name: String,
}

/// POST /api/upload
///
/// Accepts a browser multipart upload (single `file` field) and forwards it
/// to the configured automation endpoint. Upload failures are surfaced to
/// the user: unlike polling fetches, there is no retry loop to absorb them.
pub async fn upload_audio(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadAccepted>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| ApiError::BadRequest("Uploaded file has no filename".to_string()))?;
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;

        if bytes.is_empty() {
            return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
        }

        info!(file_name = %file_name, size = bytes.len(), "Received upload");
        let receipt = state
            .uploader
            .upload(&file_name, &content_type, bytes.to_vec())
            .await?;

        return Ok(Json(UploadAccepted {
            status: "success".to_string(),
            file_name: receipt.file_name,
        }));
    }

    Err(ApiError::BadRequest(
        "Missing 'file' field in multipart body".to_string(),
    ))
}
