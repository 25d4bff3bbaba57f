//! services/api/src/adapters/pdf.rs
//!
//! Text extraction for uploaded case PDFs, backed by `pdf-extract`.

use async_trait::async_trait;
use casebook_core::ports::{PortError, PortResult, TextExtractor};
use tracing::debug;

/// Implements `TextExtractor` with `pdf-extract`. Parsing is CPU-bound, so it
/// runs on the blocking pool.
#[derive(Clone, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

/// Postgres `TEXT` cannot hold NUL, which `pdf-extract` emits for some fonts.
fn clean_text(raw: &str) -> String {
    raw.replace('\0', "").trim().to_string()
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract_text(&self, pdf_bytes: &[u8]) -> PortResult<String> {
        let bytes = pdf_bytes.to_vec();
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            // A panic inside the parser surfaces here as a join error.
            .map_err(|e| PortError::Upstream(format!("PDF parser aborted: {}", e)))?
            .map_err(|e| PortError::Upstream(format!("PDF extraction error: {}", e)))?;

        let text = clean_text(&text);
        if text.is_empty() {
            return Err(PortError::Upstream("PDF contains no extractable text".to_string()));
        }
        debug!(chars = text.len(), "Extracted PDF text");
        Ok(text)
    }
}
