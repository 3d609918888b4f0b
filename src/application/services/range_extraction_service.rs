use std::sync::Arc;

use crate::application::ports::{
    BatchStore, BatchStoreError, PageSource, PageSourceError, TextRefiner, TextRefinerError,
};
use crate::domain::{ExtractedBatch, JobId, UnitRange};

/// Extracts, refines and stores the text of a single range.
///
/// This is the per-range processing function handed to the orchestrator: it
/// only returns `Ok` after the output is durably written.
pub struct RangeExtractionService {
    page_source: Arc<dyn PageSource>,
    refiner: Arc<dyn TextRefiner>,
    store: Arc<dyn BatchStore>,
}

impl RangeExtractionService {
    pub fn new(
        page_source: Arc<dyn PageSource>,
        refiner: Arc<dyn TextRefiner>,
        store: Arc<dyn BatchStore>,
    ) -> Self {
        Self {
            page_source,
            refiner,
            store,
        }
    }

    pub async fn extract(
        &self,
        job_id: &JobId,
        range: UnitRange,
    ) -> Result<ExtractedBatch, RangeExtractionError> {
        let pages = self
            .page_source
            .extract_range(range)
            .await
            .map_err(RangeExtractionError::PageSource)?;

        if pages.is_empty() {
            return Err(RangeExtractionError::NoTextFound(range.page_label()));
        }

        let raw_text = pages.join("\n\n");
        tracing::debug!(
            page_count = pages.len(),
            characters = raw_text.len(),
            "Raw text extracted"
        );

        let refined = self
            .refiner
            .refine(&raw_text)
            .await
            .map_err(RangeExtractionError::Refiner)?;

        if refined.trim().is_empty() {
            return Err(RangeExtractionError::EmptyRefinement(range.page_label()));
        }

        let output_path = self
            .store
            .write(job_id, range, &refined)
            .await
            .map_err(RangeExtractionError::Store)?;

        tracing::info!(
            path = %output_path.display(),
            characters = refined.len(),
            "Batch output written"
        );

        Ok(ExtractedBatch {
            range,
            output_path,
            characters: refined.len(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RangeExtractionError {
    #[error("page source: {0}")]
    PageSource(PageSourceError),
    #[error("no text found on pages {0}")]
    NoTextFound(String),
    #[error("refiner: {0}")]
    Refiner(TextRefinerError),
    #[error("refiner returned no content for pages {0}")]
    EmptyRefinement(String),
    #[error("batch store: {0}")]
    Store(BatchStoreError),
}
