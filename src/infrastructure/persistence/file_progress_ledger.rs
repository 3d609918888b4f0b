use std::collections::{BTreeSet, HashMap};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use crate::application::ports::{LedgerError, ProgressLedger};
use crate::domain::{JobId, LedgerEntry, UnitRange};

pub const LEDGER_FILE_NAME: &str = "processed_batches.json";

/// JSON ledger stored at `<root>/<job_id>/processed_batches.json`.
///
/// Every update rewrites the whole record through a temp file in the same
/// directory followed by a rename, so readers see either the old or the new
/// record and never a partial one. Updates for the same job are serialized by
/// a per-job async lock held across read, modify and persist.
pub struct FileProgressLedger {
    root: PathBuf,
    locks: Mutex<HashMap<JobId, Arc<Mutex<()>>>>,
}

impl FileProgressLedger {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn record_path(&self, job_id: &JobId) -> PathBuf {
        self.root.join(job_id.as_str()).join(LEDGER_FILE_NAME)
    }

    async fn lock_for(&self, job_id: &JobId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(job_id.clone()).or_default())
    }
}

#[async_trait]
impl ProgressLedger for FileProgressLedger {
    async fn load(&self, job_id: &JobId) -> Result<BTreeSet<UnitRange>, LedgerError> {
        let path = self.record_path(job_id);
        let job = job_id.clone();

        let entry = tokio::task::spawn_blocking(move || read_entry(&path, &job))
            .await
            .map_err(|e| LedgerError::Io(io::Error::other(e.to_string())))??;

        tracing::debug!(job_id = %job_id, completed = entry.completed.len(), "Ledger record read");
        Ok(entry.completed)
    }

    async fn mark_complete(&self, job_id: &JobId, range: UnitRange) -> Result<(), LedgerError> {
        let lock = self.lock_for(job_id).await;
        let _guard = lock.lock().await;

        let path = self.record_path(job_id);
        let job = job_id.clone();

        let recorded = tokio::task::spawn_blocking(move || {
            let mut entry = read_entry(&path, &job).map_err(|e| match e {
                LedgerError::Io(e) => LedgerError::PersistFailure {
                    job_id: job.clone(),
                    reason: e.to_string(),
                },
                other => other,
            })?;
            if !entry.record(range) {
                return Ok(false);
            }
            write_entry(&path, &entry).map_err(|e| LedgerError::PersistFailure {
                job_id: job.clone(),
                reason: e.to_string(),
            })?;
            Ok::<_, LedgerError>(true)
        })
        .await
        .map_err(|e| LedgerError::PersistFailure {
            job_id: job_id.clone(),
            reason: format!("task join error: {e}"),
        })??;

        if recorded {
            tracing::debug!(job_id = %job_id, range = %range, "Range recorded in ledger");
        } else {
            tracing::debug!(job_id = %job_id, range = %range, "Range already recorded");
        }
        Ok(())
    }
}

fn read_entry(path: &Path, job_id: &JobId) -> Result<LedgerEntry, LedgerError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(LedgerEntry::empty(job_id.clone()));
        }
        Err(e) => return Err(LedgerError::Io(e)),
    };

    let entry: LedgerEntry =
        serde_json::from_slice(&bytes).map_err(|e| LedgerError::Corrupt {
            job_id: job_id.clone(),
            reason: format!("{}: {e}", path.display()),
        })?;

    if entry.job_id != *job_id {
        return Err(LedgerError::Corrupt {
            job_id: job_id.clone(),
            reason: format!("{} belongs to job {}", path.display(), entry.job_id),
        });
    }

    Ok(entry)
}

fn write_entry(path: &Path, entry: &LedgerEntry) -> io::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| io::Error::other(format!("{} has no parent directory", path.display())))?;
    std::fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut temp, entry)?;
    temp.write_all(b"\n")?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    #[cfg(unix)]
    std::fs::File::open(dir)?.sync_all()?;

    Ok(())
}
