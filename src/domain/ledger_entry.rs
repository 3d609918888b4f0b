use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{JobId, UnitRange};

/// Persisted progress for one job: every range known to be fully processed
/// with its output durably written.
///
/// Absence of a range only means "not known to be complete".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub job_id: JobId,
    pub completed: BTreeSet<UnitRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl LedgerEntry {
    pub fn empty(job_id: JobId) -> Self {
        Self {
            job_id,
            completed: BTreeSet::new(),
            updated_at: None,
        }
    }

    /// Appends `range`; returns false if it was already recorded.
    pub fn record(&mut self, range: UnitRange) -> bool {
        let inserted = self.completed.insert(range);
        if inserted {
            self.updated_at = Some(Utc::now());
        }
        inserted
    }
}
