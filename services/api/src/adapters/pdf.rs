//! services/api/src/adapters/pdf.rs
//!
//! This module contains the adapter for PDF text extraction.
//! It implements the `DocumentTextService` port from the `core` crate using `lopdf`.

use async_trait::async_trait;
use lopdf::Document;
use quiz_core::ports::{DocumentTextService, PortError, PortResult};
use tracing::info;

const PDF_MAGIC: &[u8] = b"%PDF";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `DocumentTextService` for PDF uploads.
#[derive(Clone, Debug)]
pub struct LopdfTextAdapter {
    max_pages: usize,
}

impl LopdfTextAdapter {
    /// Creates a new `LopdfTextAdapter` accepting documents of at most `max_pages` pages.
    pub fn new(max_pages: usize) -> Self {
        Self { max_pages }
    }

    fn extract_blocking(bytes: &[u8], max_pages: usize) -> PortResult<String> {
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(PortError::InvalidDocument(
                "uploaded file is not a PDF".to_string(),
            ));
        }

        let document = Document::load_mem(bytes)
            .map_err(|e| PortError::InvalidDocument(format!("failed to load PDF: {}", e)))?;
        let page_numbers: Vec<u32> = document.get_pages().into_keys().collect();
        let readable = pages_to_read(page_numbers.len(), max_pages)?;

        let mut extracted = String::new();
        for page_number in page_numbers.into_iter().take(readable) {
            let page_text = document.extract_text(&[page_number]).map_err(|e| {
                PortError::Unexpected(format!("failed to extract page {}: {}", page_number, e))
            })?;
            extracted.push_str(page_text.trim());
            extracted.push_str("\n\n");
        }

        info!("Extracted {} characters from {} pages.", extracted.len(), readable);
        Ok(extracted)
    }
}

/// Checks a page count against the limit and returns how many pages to read.
pub fn pages_to_read(pages: usize, max_pages: usize) -> PortResult<usize> {
    if pages == 0 {
        return Err(PortError::InvalidDocument("PDF has no pages".to_string()));
    }
    if pages > max_pages {
        return Err(PortError::TooManyPages {
            pages,
            limit: max_pages,
        });
    }
    Ok(pages)
}

//=========================================================================================
// `DocumentTextService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentTextService for LopdfTextAdapter {
    /// Extracts the text of every accepted page, one blank line between pages.
    async fn extract_text(&self, document: &[u8]) -> PortResult<String> {
        let bytes = document.to_vec();
        let max_pages = self.max_pages;
        tokio::task::spawn_blocking(move || Self::extract_blocking(&bytes, max_pages))
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nine_pages_are_all_read() {
        assert_eq!(pages_to_read(9, 9).unwrap(), 9);
        assert_eq!(pages_to_read(1, 9).unwrap(), 1);
    }

    #[test]
    fn ten_pages_are_rejected() {
        assert!(matches!(
            pages_to_read(10, 9),
            Err(PortError::TooManyPages { pages: 10, limit: 9 })
        ));
    }

    #[test]
    fn empty_document_is_invalid() {
        assert!(matches!(pages_to_read(0, 9), Err(PortError::InvalidDocument(_))));
    }

    #[tokio::test]
    async fn non_pdf_bytes_are_rejected() {
        let adapter = LopdfTextAdapter::new(9);
        let result = adapter.extract_text(b"hello, I am plain text").await;
        assert!(matches!(result, Err(PortError::InvalidDocument(_))));
    }
}
