use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use pdf_oxide::PdfDocument;

use crate::application::ports::{PageSource, PageSourceError};
use crate::domain::UnitRange;

use super::text_sanitizer::sanitize_extracted_text;

const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(60);

/// Reads page text from a local PDF file.
///
/// The document is reopened for every call so concurrent ranges never share
/// parser state.
pub struct PdfPageSource {
    path: PathBuf,
}

impl PdfPageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn open(path: &Path) -> Result<PdfDocument, PageSourceError> {
        PdfDocument::open(path).map_err(|e| {
            PageSourceError::OpenFailed(format!("failed to parse {}: {e}", path.display()))
        })
    }

    fn count_pages(path: &Path) -> Result<usize, PageSourceError> {
        let mut doc = Self::open(path)?;
        doc.page_count().map_err(|e| {
            PageSourceError::ExtractionFailed(format!("failed to read page count: {e}"))
        })
    }

    fn read_pages(path: &Path, range: UnitRange) -> Result<Vec<String>, PageSourceError> {
        let mut doc = Self::open(path)?;
        let page_count = doc.page_count().map_err(|e| {
            PageSourceError::ExtractionFailed(format!("failed to read page count: {e}"))
        })?;

        if range.end() >= page_count {
            return Err(PageSourceError::OutOfBounds {
                page: range.end(),
                page_count,
            });
        }

        let mut pages = Vec::with_capacity(range.len());
        for page_index in range.pages() {
            match doc.extract_text(page_index) {
                Ok(text) => {
                    let text = sanitize_extracted_text(&text);
                    if !text.is_empty() {
                        pages.push(text);
                    }
                }
                Err(e) => {
                    tracing::warn!(page = page_index + 1, error = %e, "Skipping unreadable page");
                }
            }
        }

        Ok(pages)
    }

    async fn blocking<T, F>(&self, work: F) -> Result<T, PageSourceError>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> Result<T, PageSourceError> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::time::timeout(
            EXTRACTION_TIMEOUT,
            tokio::task::spawn_blocking(move || work(&path)),
        )
        .await
        .map_err(|_| PageSourceError::ExtractionFailed("PDF extraction timed out".to_string()))?
        .map_err(|e| PageSourceError::ExtractionFailed(format!("task join error: {e}")))?
    }
}

#[async_trait]
impl PageSource for PdfPageSource {
    async fn page_count(&self) -> Result<usize, PageSourceError> {
        let count = self.blocking(Self::count_pages).await?;
        tracing::info!(path = %self.path.display(), page_count = count, "PDF opened");
        Ok(count)
    }

    #[tracing::instrument(skip(self, range), fields(pages = %range.page_label()))]
    async fn extract_range(&self, range: UnitRange) -> Result<Vec<String>, PageSourceError> {
        let pages = self
            .blocking(move |path| Self::read_pages(path, range))
            .await?;
        tracing::debug!(pages_with_text = pages.len(), "PDF text extraction complete");
        Ok(pages)
    }
}
