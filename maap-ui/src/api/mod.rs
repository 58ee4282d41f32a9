//! HTTP API handlers for maap-ui

pub mod export;
pub mod health;
pub mod records;
pub mod ui;
pub mod upload;
pub mod watch;

pub use export::{export_document, export_text};
pub use health::health_routes;
pub use records::{get_record, list_records};
pub use ui::serve_index;
pub use upload::upload_audio;
pub use watch::watch_result;
