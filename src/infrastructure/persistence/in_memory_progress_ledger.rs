use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::application::ports::{LedgerError, ProgressLedger};
use crate::domain::{JobId, LedgerEntry, UnitRange};

/// Process-local ledger. Progress is lost on exit; used for dry runs and tests.
#[derive(Default)]
pub struct InMemoryProgressLedger {
    entries: Mutex<HashMap<JobId, LedgerEntry>>,
}

impl InMemoryProgressLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_completed(job_id: JobId, ranges: impl IntoIterator<Item = UnitRange>) -> Self {
        let mut entry = LedgerEntry::empty(job_id.clone());
        for range in ranges {
            entry.record(range);
        }
        Self {
            entries: Mutex::new(HashMap::from([(job_id, entry)])),
        }
    }
}

#[async_trait]
impl ProgressLedger for InMemoryProgressLedger {
    async fn load(&self, job_id: &JobId) -> Result<BTreeSet<UnitRange>, LedgerError> {
        let entries = self.entries.lock().await;
        Ok(entries
            .get(job_id)
            .map(|entry| entry.completed.clone())
            .unwrap_or_default())
    }

    async fn mark_complete(&self, job_id: &JobId, range: UnitRange) -> Result<(), LedgerError> {
        let mut entries = self.entries.lock().await;
        entries
            .entry(job_id.clone())
            .or_insert_with(|| LedgerEntry::empty(job_id.clone()))
            .record(range);
        Ok(())
    }
}
