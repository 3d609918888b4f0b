use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{BatchStore, BatchStoreError};
use crate::domain::{JobId, UnitRange};

/// Outcome of assembling a job's batches into one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationSummary {
    pub batches: usize,
    pub output_path: Option<PathBuf>,
}

/// Concatenates every stored batch of a job, in page order, into a single document.
pub struct AggregationService {
    store: Arc<dyn BatchStore>,
}

impl AggregationService {
    pub fn new(store: Arc<dyn BatchStore>) -> Self {
        Self { store }
    }

    /// Assembles every stored batch of `job_id`.
    ///
    /// Fails with [`AggregationError::Overlap`] when stored batches cover the
    /// same page twice, which happens after the batch size was changed; use
    /// [`AggregationService::aggregate_ranges`] with the current partition
    /// in that case.
    #[tracing::instrument(skip(self, job_id), fields(job_id = %job_id))]
    pub async fn aggregate(&self, job_id: &JobId) -> Result<AggregationSummary, AggregationError> {
        let batches = self.store.list(job_id).await?;

        for window in batches.windows(2) {
            let (previous, next) = (window[0].0, window[1].0);
            if next.start() <= previous.end() {
                return Err(AggregationError::Overlap {
                    first: previous,
                    second: next,
                });
            }
            if next.start() != previous.end() + 1 {
                tracing::warn!(
                    after = %previous.page_label(),
                    before = %next.page_label(),
                    "Gap between batches"
                );
            }
        }

        self.assemble(job_id, batches).await
    }

    /// Assembles exactly the batches for `ranges`, ignoring any other stored
    /// batch of the job. Every range must have a stored batch.
    #[tracing::instrument(skip(self, job_id, ranges), fields(job_id = %job_id, ranges = ranges.len()))]
    pub async fn aggregate_ranges(
        &self,
        job_id: &JobId,
        ranges: &[UnitRange],
    ) -> Result<AggregationSummary, AggregationError> {
        let mut stored: BTreeMap<UnitRange, PathBuf> =
            self.store.list(job_id).await?.into_iter().collect();

        let mut selected = Vec::with_capacity(ranges.len());
        for range in ranges {
            let path = stored
                .remove(range)
                .ok_or_else(|| AggregationError::MissingBatch(range.page_label()))?;
            selected.push((*range, path));
        }
        selected.sort_by_key(|(range, _)| *range);

        if !stored.is_empty() {
            tracing::info!(
                ignored = stored.len(),
                "Ignoring stored batches outside the requested ranges"
            );
        }

        self.assemble(job_id, selected).await
    }

    async fn assemble(
        &self,
        job_id: &JobId,
        batches: Vec<(UnitRange, PathBuf)>,
    ) -> Result<AggregationSummary, AggregationError> {
        if batches.is_empty() {
            tracing::warn!("No batch output found, nothing to assemble");
            return Ok(AggregationSummary {
                batches: 0,
                output_path: None,
            });
        }

        let mut parts = Vec::with_capacity(batches.len());
        for (range, path) in &batches {
            let content = self.store.read(path).await?;
            tracing::debug!(
                pages = %range.page_label(),
                characters = content.len(),
                "Appending batch"
            );
            parts.push(content.trim_end().to_string());
        }

        let document = parts.join("\n\n");
        let output_path = self.store.write_assembled(job_id, &document).await?;

        tracing::info!(
            batches = batches.len(),
            path = %output_path.display(),
            "Document assembled"
        );

        Ok(AggregationSummary {
            batches: batches.len(),
            output_path: Some(output_path),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregationError {
    #[error("batch store: {0}")]
    Store(#[from] BatchStoreError),
    #[error(
        "stored batches for pages {} and {} overlap; they were written with different batch sizes",
        first.page_label(),
        second.page_label()
    )]
    Overlap { first: UnitRange, second: UnitRange },
    #[error("no stored batch for pages {0}")]
    MissingBatch(String),
}
