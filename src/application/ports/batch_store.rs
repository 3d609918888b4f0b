use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::{JobId, UnitRange};

/// Durable home for per-range output and the assembled document.
#[async_trait]
pub trait BatchStore: Send + Sync {
    /// Writes `content` for `range`. The write is complete and durable once this returns `Ok`.
    async fn write(
        &self,
        job_id: &JobId,
        range: UnitRange,
        content: &str,
    ) -> Result<PathBuf, BatchStoreError>;

    /// Every stored batch for `job_id`, sorted by range start.
    async fn list(&self, job_id: &JobId) -> Result<Vec<(UnitRange, PathBuf)>, BatchStoreError>;

    async fn read(&self, path: &Path) -> Result<String, BatchStoreError>;

    /// Writes the single ordered document assembled from all batches.
    async fn write_assembled(&self, job_id: &JobId, content: &str)
    -> Result<PathBuf, BatchStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BatchStoreError {
    #[error("refusing to write empty output for pages {0}")]
    EmptyContent(String),
    #[error("write failed: {0}")]
    WriteFailed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
