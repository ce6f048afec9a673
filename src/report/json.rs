use super::EMPTY_PAGE_TEXT;
use crate::pagination::Page;
use serde::Serialize;

#[derive(Serialize)]
struct JsonDocument<'a, T> {
    title: &'a str,
    page_count: usize,
    pages: &'a [Page<T>],
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

/// JSON formatter for report documents
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format a paged document as pretty-printed JSON
    ///
    /// An empty document still reports one page and carries the empty-page
    /// message.
    pub fn format<T: Serialize>(title: &str, pages: &[Page<T>]) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::document(title, pages))
    }

    /// Format as compact JSON (no whitespace)
    pub fn format_compact<T: Serialize>(title: &str, pages: &[Page<T>]) -> Result<String, serde_json::Error> {
        serde_json::to_string(&Self::document(title, pages))
    }

    fn document<'a, T>(title: &'a str, pages: &'a [Page<T>]) -> JsonDocument<'a, T> {
        JsonDocument {
            title,
            page_count: pages.len().max(1),
            pages,
            message: pages.is_empty().then_some(EMPTY_PAGE_TEXT),
        }
    }
}
