use async_trait::async_trait;

use crate::domain::UnitRange;

/// Read access to a paginated source document.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn page_count(&self) -> Result<usize, PageSourceError>;

    /// Text of every page in `range`, in page order. Pages without text are omitted.
    async fn extract_range(&self, range: UnitRange) -> Result<Vec<String>, PageSourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PageSourceError {
    #[error("failed to open document: {0}")]
    OpenFailed(String),
    #[error("page {page} is out of bounds for a document of {page_count} pages")]
    OutOfBounds { page: usize, page_count: usize },
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),
}
