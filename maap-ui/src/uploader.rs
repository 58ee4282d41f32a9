//! Uploader client
//!
//! Forwards an uploaded audio file to the external automation endpoint. Two
//! wire encodings exist across deployments, selected by configuration:
//! multipart form data, or a JSON envelope with a base64-encoded body.
//!
//! Unlike polling fetches, upload failures are always surfaced to the user:
//! without a parseable status response there is no way to know whether the
//! file landed.

use base64::{engine::general_purpose, Engine as _};
use maap_common::config::UploadEncoding;
use maap_common::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

/// Confirmation returned by a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Canonical filename assigned by the remote store. This is the
    /// identifier the watcher correlates on, so the remote's name wins over
    /// the locally submitted one.
    pub file_name: String,
}

/// HTTP client for the upload endpoint
#[derive(Debug, Clone)]
pub struct UploaderClient {
    http_client: Client,
    url: String,
    encoding: UploadEncoding,
}

impl UploaderClient {
    /// Create a client. Uploads carry the whole file body, so the timeout
    /// is configured separately from (and longer than) fetch timeouts.
    pub fn new(url: String, encoding: UploadEncoding, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            http_client,
            url,
            encoding,
        })
    }

    /// Upload one audio file and return the canonical filename.
    ///
    /// # Errors
    /// - `Transport` for network/HTTP failures
    /// - `MalformedResponse` if the endpoint returns a non-JSON body
    ///   (success cannot be determined, so this is a hard error)
    /// - `Transport` with the endpoint's message if it reports failure
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadReceipt> {
        debug!(
            file_name,
            content_type,
            size = bytes.len(),
            encoding = ?self.encoding,
            "Forwarding upload"
        );

        let request = match self.encoding {
            UploadEncoding::Multipart => {
                let part = reqwest::multipart::Part::bytes(bytes)
                    .file_name(file_name.to_string())
                    .mime_str(content_type)
                    .map_err(|e| Error::InvalidInput(format!("Invalid MIME type: {}", e)))?;
                let form = reqwest::multipart::Form::new().part("file", part);
                self.http_client.post(&self.url).multipart(form)
            }
            UploadEncoding::Base64Json => {
                let envelope = build_envelope(file_name, content_type, &bytes);
                self.http_client.post(&self.url).json(&envelope)
            }
        };

        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Upload request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("Failed to read upload response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::Transport(format!(
                "Upload endpoint returned HTTP {}: {}",
                status, body
            )));
        }

        let parsed: UploadResponse = serde_json::from_str(&body).map_err(|_| {
            Error::MalformedResponse(format!(
                "Upload endpoint returned non-JSON body: {}",
                truncate(&body, 200)
            ))
        })?;

        if parsed.status != "success" {
            return Err(Error::Transport(format!(
                "Upload failed: {}",
                parsed.message.unwrap_or(parsed.status)
            )));
        }

        // Fall back to the submitted name if the endpoint does not echo one
        let canonical = parsed
            .file_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| file_name.to_string());

        info!(file_name = %canonical, "Upload accepted");
        Ok(UploadReceipt {
            file_name: canonical,
        })
    }
}

/// Build the base64-JSON upload envelope
fn build_envelope(file_name: &str, content_type: &str, bytes: &[u8]) -> serde_json::Value {
    json!({
        "fileName": file_name,
        "mimeType": content_type,
        "data": general_purpose::STANDARD.encode(bytes),
    })
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    status: String,
    #[serde(rename = "fileName")]
    file_name: Option<String>,
    message: Option<String>,
}
