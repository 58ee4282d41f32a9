//! Export renderings of a single analysis record
//!
//! Two formats, both pure formatting over `labeled_fields()`:
//! - Flat text: one `Label: value` line per field, fixed field order.
//! - Paginated document: a title block followed by label/value pairs split
//!   across numbered pages.
//!
//! Absent values render as an em dash, matching the quick-view display.

use chrono::Local;
use maap_common::AnalysisRecord;

/// Rendering for a field with no value
const PLACEHOLDER: &str = "—";

/// Default number of label/value lines per document page
pub const DEFAULT_LINES_PER_PAGE: usize = 18;

/// Render a record as flat text: one `Label: value` line per field, in the
/// fixed display order.
pub fn flat_text(record: &AnalysisRecord) -> String {
    let mut out = String::new();
    for (label, value) in record.labeled_fields() {
        out.push_str(label);
        out.push_str(": ");
        out.push_str(value.unwrap_or(PLACEHOLDER));
        out.push('\n');
    }
    out
}

/// A paginated document rendering of one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDocument {
    title: String,
    subtitle: String,
    generated: String,
    pages: Vec<Vec<String>>,
}

impl RecordDocument {
    /// Build a document from a record, splitting the field lines into pages
    /// of at most `lines_per_page` entries (minimum 1).
    pub fn build(record: &AnalysisRecord, lines_per_page: usize) -> Self {
        let lines_per_page = lines_per_page.max(1);

        let title = format!(
            "Audio Analysis Report — {}",
            record.student_id.as_deref().unwrap_or("Unnamed")
        );
        let subtitle = format!(
            "File: {}",
            record.audio_file.as_deref().unwrap_or(PLACEHOLDER)
        );
        let generated = format!(
            "Generated: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );

        let lines: Vec<String> = record
            .labeled_fields()
            .iter()
            .map(|(label, value)| format!("{}: {}", label, value.unwrap_or(PLACEHOLDER)))
            .collect();

        let pages = lines
            .chunks(lines_per_page)
            .map(|chunk| chunk.to_vec())
            .collect();

        Self {
            title,
            subtitle,
            generated,
            pages,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Render the document: title block on the first page, then the
    /// label/value pages, each with a `Page i of n` header.
    pub fn render(&self) -> String {
        let total = self.pages.len();
        let mut out = String::new();

        out.push_str(&self.title);
        out.push('\n');
        out.push_str(&self.subtitle);
        out.push('\n');
        out.push_str(&self.generated);
        out.push('\n');

        for (i, page) in self.pages.iter().enumerate() {
            out.push('\n');
            out.push_str(&format!("--- Page {} of {} ---\n", i + 1, total));
            for line in page {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }
}
