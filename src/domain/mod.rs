mod extracted_batch;
mod job_id;
mod ledger_entry;
mod range_outcome;
mod unit_range;

pub use extracted_batch::ExtractedBatch;
pub use job_id::{JobId, JobIdError};
pub use ledger_entry::LedgerEntry;
pub use range_outcome::{RangeFailure, RangeOutcome, RangeResult, RunReport, RunSummary};
pub use unit_range::{UnitRange, UnitRangeError, partition};
