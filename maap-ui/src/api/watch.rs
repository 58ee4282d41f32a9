//! Watch handler: poll the record store until the analysis result appears

use axum::extract::State;
use axum::Json;
use maap_common::config::interval_from_seconds;
use maap_common::AnalysisRecord;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::ApiResult;
use crate::watcher::{ResultWatcher, WatchOutcome};
use crate::AppState;

/// Watch request. Attempt count and interval default to the configured
/// polling cadence.
#[derive(Debug, Deserialize)]
pub struct WatchRequest {
    /// Identifier to correlate on (the canonical filename from the upload)
    pub file_name: String,
    pub max_attempts: Option<u32>,
    pub interval_seconds: Option<f64>,
}

/// Watch outcome as reported to the UI. Timeout is a normal terminal state
/// (HTTP 200), distinguishable from transport errors; the UI tells the user
/// to refresh manually.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum WatchResponse {
    Found {
        attempt: u32,
        index: usize,
        record: AnalysisRecord,
    },
    Timeout {
        attempts: u32,
    },
    Cancelled {
        attempts: u32,
    },
}

/// POST /api/watch
///
/// Runs the watcher against the record store, blocking the request for up
/// to `max_attempts x interval` wall-clock time. On success the freshly
/// fetched collection replaces the shared cache, so the reported index is
/// immediately addressable by the record and export endpoints.
pub async fn watch_result(
    State(state): State<AppState>,
    Json(request): Json<WatchRequest>,
) -> ApiResult<Json<WatchResponse>> {
    let max_attempts = request
        .max_attempts
        .unwrap_or(state.config.poll_max_attempts);
    // Rejects non-positive, non-finite, and out-of-range intervals as a
    // bad request before any Duration is constructed
    let interval = match request.interval_seconds {
        Some(seconds) => interval_from_seconds(seconds)?,
        None => state.config.poll_interval(),
    };

    let watcher = ResultWatcher::new(state.config.detection_policy, max_attempts, interval)?;

    let cancel = CancellationToken::new();
    let outcome = watcher
        .await_result(&state.store, &request.file_name, &cancel)
        .await?;

    let response = match outcome {
        WatchOutcome::Found {
            attempt,
            index,
            records,
        } => {
            let record = records[index].clone();
            *state.records.write().await = records;
            WatchResponse::Found {
                attempt,
                index,
                record,
            }
        }
        WatchOutcome::TimedOut { attempts } => WatchResponse::Timeout { attempts },
        WatchOutcome::Cancelled { attempts } => WatchResponse::Cancelled { attempts },
    };

    Ok(Json(response))
}
