use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::stream;
use futures::{FutureExt, StreamExt};
use tracing::Instrument;

use crate::application::ports::{LedgerError, ProgressLedger};
use crate::domain::{
    JobId, RangeFailure, RangeOutcome, RangeResult, RunReport, UnitRange, partition,
};

/// Drives a job to completion: partition, skip what the ledger already has,
/// dispatch the rest with bounded concurrency, record each success.
pub struct BatchOrchestrator {
    ledger: Arc<dyn ProgressLedger>,
}

impl BatchOrchestrator {
    pub fn new(ledger: Arc<dyn ProgressLedger>) -> Self {
        Self { ledger }
    }

    /// Processes every range of `job_id` not yet in the ledger.
    ///
    /// Per-range failures are returned inside the report; only invalid
    /// configuration and ledger load errors abort the run, and they do so
    /// before anything is dispatched. A range is reported as succeeded only
    /// once its completion has been persisted. A panic inside `process_fn`
    /// fails only the range that raised it.
    pub async fn run<F, Fut, T, E>(
        &self,
        job_id: &JobId,
        total_units: usize,
        batch_size: usize,
        max_concurrency: usize,
        process_fn: F,
    ) -> Result<RunReport<T>, OrchestratorError>
    where
        F: Fn(UnitRange) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        validate(batch_size, max_concurrency)?;

        let span = tracing::info_span!(
            "batch_job",
            job_id = %job_id,
            total_units,
            batch_size,
            max_concurrency,
        );

        self.dispatch(job_id, total_units, batch_size, max_concurrency, process_fn)
            .instrument(span)
            .await
    }

    async fn dispatch<F, Fut, T, E>(
        &self,
        job_id: &JobId,
        total_units: usize,
        batch_size: usize,
        max_concurrency: usize,
        process_fn: F,
    ) -> Result<RunReport<T>, OrchestratorError>
    where
        F: Fn(UnitRange) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        if total_units == 0 {
            tracing::info!("Source has no units, nothing to dispatch");
            return Ok(RunReport::new(job_id.clone(), Vec::new()));
        }

        let ranges = partition(total_units, batch_size)
            .map_err(|e| OrchestratorError::InvalidConfig(e.to_string()))?;
        let total_ranges = ranges.len();

        let completed = self.ledger.load(job_id).await?;
        tracing::debug!(recorded = completed.len(), "Ledger loaded");

        let (skipped, pending): (Vec<UnitRange>, Vec<UnitRange>) =
            ranges.into_iter().partition(|r| completed.contains(r));

        tracing::info!(
            pending = pending.len(),
            skipped = skipped.len(),
            total = total_ranges,
            "Dispatching pending ranges"
        );

        let mut results: Vec<RangeResult<T>> = skipped
            .into_iter()
            .map(|range| RangeResult {
                range,
                outcome: RangeOutcome::Skipped,
            })
            .collect();

        let process_fn = &process_fn;
        let dispatched: Vec<RangeResult<T>> = stream::iter(pending)
            .map(|range| {
                let span = tracing::info_span!("range", pages = %range.page_label());
                async move {
                    let outcome = self.process_range(job_id, range, process_fn).await;
                    RangeResult { range, outcome }
                }
                .instrument(span)
            })
            .buffer_unordered(max_concurrency)
            .collect()
            .await;

        results.extend(dispatched);

        let report = RunReport::new(job_id.clone(), results);
        let summary = report.summary();
        tracing::info!(
            skipped = summary.skipped,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Batch job finished"
        );

        Ok(report)
    }

    async fn process_range<F, Fut, T, E>(
        &self,
        job_id: &JobId,
        range: UnitRange,
        process_fn: &F,
    ) -> RangeOutcome<T>
    where
        F: Fn(UnitRange) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let attempt = AssertUnwindSafe(async { process_fn(range).await })
            .catch_unwind()
            .await;

        let value = match attempt {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Range processing failed");
                return RangeOutcome::Failed(RangeFailure::Unit(e.to_string()));
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(panic = %message, "Range processing panicked");
                return RangeOutcome::Failed(RangeFailure::Unit(format!("panicked: {message}")));
            }
        };

        match self.ledger.mark_complete(job_id, range).await {
            Ok(()) => {
                tracing::info!("Range completed and recorded");
                RangeOutcome::Succeeded(value)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Range processed but completion could not be recorded; it will be redone"
                );
                RangeOutcome::Failed(RangeFailure::Persist(e.to_string()))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn validate(batch_size: usize, max_concurrency: usize) -> Result<(), OrchestratorError> {
    if batch_size == 0 {
        return Err(OrchestratorError::InvalidConfig(
            "batch_size must be at least 1".to_string(),
        ));
    }
    if max_concurrency == 0 {
        return Err(OrchestratorError::InvalidConfig(
            "max_concurrency must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
