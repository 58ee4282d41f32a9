//! Record store client
//!
//! Reads the full analysis record collection from the configured endpoint.
//! The store is read-only from the portal's point of view: this client only
//! issues GETs and decodes what comes back. No pagination, authentication,
//! or schema versioning exists on this interface.

use async_trait::async_trait;
use maap_common::record::decode_collection;
use maap_common::{AnalysisRecord, Error, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::watcher::RecordSource;

/// HTTP client for the remote record store
#[derive(Debug, Clone)]
pub struct RecordStoreClient {
    http_client: Client,
    url: String,
}

impl RecordStoreClient {
    /// Create a client with a per-request timeout.
    ///
    /// The timeout is what bounds a hung fetch; the watcher itself places no
    /// limit on an individual attempt.
    pub fn new(url: String, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { http_client, url })
    }

    /// Fetch the current record collection.
    ///
    /// The request carries a `ts` cache-busting query parameter, since some
    /// store frontends cache GET responses aggressively.
    ///
    /// # Errors
    /// - `Transport` for network/HTTP failures
    /// - `MalformedResponse` for non-JSON or non-array bodies
    ///
    /// Callers pick the recovery: the watcher treats any error as "no change
    /// this attempt", the records endpoint maps malformed bodies to an empty
    /// list.
    pub async fn fetch_records(&self) -> Result<Vec<AnalysisRecord>> {
        let ts = chrono::Utc::now().timestamp_millis().to_string();
        let response = self
            .http_client
            .get(&self.url)
            .query(&[("ts", ts.as_str())])
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Record store request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Transport(format!(
                "Record store returned HTTP {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("Failed to read record store body: {}", e)))?;

        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| Error::MalformedResponse(format!("Record store body is not JSON: {}", e)))?;

        if !value.is_array() {
            return Err(Error::MalformedResponse(
                "Record store body is not a JSON array".to_string(),
            ));
        }

        let (records, quarantined) = decode_collection(&value);
        if quarantined > 0 {
            warn!(quarantined, "Skipped malformed record store entries");
        }
        debug!(records = records.len(), "Fetched record collection");
        Ok(records)
    }
}

#[async_trait]
impl RecordSource for RecordStoreClient {
    async fn fetch(&self) -> Result<Vec<AnalysisRecord>> {
        self.fetch_records().await
    }
}
