use super::{JobId, UnitRange};

/// What happened to one range during a single `run`.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeOutcome<T> {
    /// Already in the ledger at start; not re-executed this run.
    Skipped,
    Succeeded(T),
    Failed(RangeFailure),
}

impl<T> RangeOutcome<T> {
    pub fn is_skipped(&self) -> bool {
        matches!(self, RangeOutcome::Skipped)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RangeOutcome::Succeeded(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RangeOutcome::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeFailure {
    /// The processing function itself failed.
    #[error("unit failure: {0}")]
    Unit(String),
    /// Processing succeeded but the completion could not be recorded.
    #[error("persist failure: {0}")]
    Persist(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeResult<T> {
    pub range: UnitRange,
    pub outcome: RangeOutcome<T>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub skipped: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.skipped + self.succeeded + self.failed
    }

    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// Per-range results of one run, always in range-start order.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport<T> {
    pub job_id: JobId,
    results: Vec<RangeResult<T>>,
}

impl<T> RunReport<T> {
    pub fn new(job_id: JobId, mut results: Vec<RangeResult<T>>) -> Self {
        results.sort_by_key(|r| r.range);
        Self { job_id, results }
    }

    pub fn results(&self) -> &[RangeResult<T>] {
        &self.results
    }

    pub fn summary(&self) -> RunSummary {
        self.results
            .iter()
            .fold(RunSummary::default(), |mut acc, r| {
                match r.outcome {
                    RangeOutcome::Skipped => acc.skipped += 1,
                    RangeOutcome::Succeeded(_) => acc.succeeded += 1,
                    RangeOutcome::Failed(_) => acc.failed += 1,
                }
                acc
            })
    }

    pub fn failed_ranges(&self) -> impl Iterator<Item = (UnitRange, &RangeFailure)> {
        self.results.iter().filter_map(|r| match &r.outcome {
            RangeOutcome::Failed(failure) => Some((r.range, failure)),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
