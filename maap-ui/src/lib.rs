//! maap-ui library - Mentoring Audio Analysis Portal service
//!
//! Uploads audio to the external automation endpoint, watches the remote
//! record store for the analysis result, and serves the portal UI with
//! export downloads.

use axum::Router;
use maap_common::{AnalysisRecord, PortalConfig, Result};
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod api;
pub mod error;
pub mod export;
pub mod store;
pub mod uploader;
pub mod watcher;

pub use error::{ApiError, ApiResult};

use store::RecordStoreClient;
use uploader::UploaderClient;

/// Application state shared across HTTP handlers.
///
/// All session state lives here and is passed explicitly into handlers via
/// axum `State`; there is no process-global mutable state. `records` is the
/// last collection fetched from the store, used to address records by index
/// for the quick view and exports. Watch operations keep their own private
/// snapshots and only write back here on success.
#[derive(Clone)]
pub struct AppState {
    /// Portal configuration (validated at startup)
    pub config: Arc<PortalConfig>,
    /// Record store client
    pub store: RecordStoreClient,
    /// Upload forwarding client
    pub uploader: UploaderClient,
    /// Last fetched record collection
    pub records: Arc<RwLock<Vec<AnalysisRecord>>>,
}

impl AppState {
    /// Create application state from a validated configuration
    pub fn new(config: PortalConfig) -> Result<Self> {
        let store = RecordStoreClient::new(config.store_url.clone(), config.fetch_timeout())?;
        let uploader = UploaderClient::new(
            config.upload_url.clone(),
            config.upload_encoding,
            config.upload_timeout(),
        )?;
        Ok(Self {
            config: Arc::new(config),
            store,
            uploader,
            records: Arc::new(RwLock::new(Vec::new())),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/", get(api::serve_index))
        .route("/api/records", get(api::list_records))
        .route("/api/records/:index", get(api::get_record))
        .route("/api/upload", post(api::upload_audio))
        .route("/api/watch", post(api::watch_result))
        .route("/api/export/:index/text", get(api::export_text))
        .route("/api/export/:index/document", get(api::export_document))
        .merge(api::health_routes())
        .with_state(state)
}
