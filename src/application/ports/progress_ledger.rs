use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::{JobId, UnitRange};

/// Durable record of which ranges of a job are complete.
///
/// Implementations must serialize `mark_complete` calls for the same job so
/// that concurrent callers never lose a previously recorded range, and must
/// replace the persisted record atomically.
#[async_trait]
pub trait ProgressLedger: Send + Sync {
    /// Completed ranges for `job_id`; empty when nothing has been recorded yet.
    async fn load(&self, job_id: &JobId) -> Result<BTreeSet<UnitRange>, LedgerError>;

    /// Adds `range` and persists the full set before returning. Idempotent.
    async fn mark_complete(&self, job_id: &JobId, range: UnitRange) -> Result<(), LedgerError>;

    async fn is_complete(&self, job_id: &JobId, range: UnitRange) -> Result<bool, LedgerError> {
        Ok(self.load(job_id).await?.contains(&range))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger for job {job_id} is corrupt: {reason}")]
    Corrupt { job_id: JobId, reason: String },
    #[error("failed to persist ledger for job {job_id}: {reason}")]
    PersistFailure { job_id: JobId, reason: String },
    #[error("ledger io error: {0}")]
    Io(#[from] std::io::Error),
}
