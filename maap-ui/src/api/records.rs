//! Record listing and lookup handlers

use axum::extract::{Path, State};
use axum::Json;
use maap_common::{AnalysisRecord, Error};
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/records
///
/// Fetches the current collection from the record store and refreshes the
/// shared cache. A malformed store body (non-JSON or non-array) yields the
/// previously fetched records, leaving the cache untouched so existing
/// quick-view and export links stay addressable; transport failures
/// surface as upstream errors.
pub async fn list_records(State(state): State<AppState>) -> ApiResult<Json<Vec<AnalysisRecord>>> {
    let records = match state.store.fetch_records().await {
        Ok(records) => records,
        Err(Error::MalformedResponse(msg)) => {
            warn!(error = %msg, "Record store body not a record list; keeping previous records");
            return Ok(Json(state.records.read().await.clone()));
        }
        Err(e) => return Err(e.into()),
    };

    *state.records.write().await = records.clone();
    Ok(Json(records))
}

/// GET /api/records/:index
///
/// Returns one record from the cached collection by position.
pub async fn get_record(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> ApiResult<Json<AnalysisRecord>> {
    let records = state.records.read().await;
    records
        .get(index)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No record at index {}", index)))
}
