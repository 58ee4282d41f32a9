//! UI serving route
//!
//! Serves the single-page portal UI, embedded at compile time.

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../ui/index.html");

/// GET /
///
/// Serves the main portal page
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
