//! Export download handlers
//!
//! Both endpoints address a record by its index in the cached collection
//! and return a text/plain attachment.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use maap_common::AnalysisRecord;

use crate::error::{ApiError, ApiResult};
use crate::export::{flat_text, RecordDocument, DEFAULT_LINES_PER_PAGE};
use crate::AppState;

async fn cached_record(state: &AppState, index: usize) -> ApiResult<AnalysisRecord> {
    let records = state.records.read().await;
    records
        .get(index)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("No record at index {}", index)))
}

fn attachment(file_name: &str, body: String) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    )
        .into_response()
}

/// GET /api/export/:index/text
///
/// Flat-text rendering: one `Label: value` line per field, fixed order.
pub async fn export_text(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> ApiResult<Response> {
    let record = cached_record(&state, index).await?;
    Ok(attachment(
        &format!("record_{}.txt", index),
        flat_text(&record),
    ))
}

/// GET /api/export/:index/document
///
/// Paginated document rendering: title block, then label/value pages.
pub async fn export_document(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> ApiResult<Response> {
    let record = cached_record(&state, index).await?;
    let document = RecordDocument::build(&record, DEFAULT_LINES_PER_PAGE);
    Ok(attachment(
        &format!("record_{}_report.txt", index),
        document.render(),
    ))
}
