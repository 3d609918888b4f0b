use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tempfile::NamedTempFile;

use crate::application::ports::{BatchStore, BatchStoreError};
use crate::domain::{JobId, UnitRange};

const MARKDOWN_DIR: &str = "markdown";

static BATCH_FILE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^pages_(\d+)-(\d+)\.md$").unwrap());

/// Stores each range as `<root>/<job_id>/markdown/pages_<first>-<last>.md`
/// (one-based, inclusive) and the assembled document as `<root>/<job_id>/<job_id>.md`.
pub struct MarkdownBatchStore {
    root: PathBuf,
}

impl MarkdownBatchStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn batch_dir(&self, job_id: &JobId) -> PathBuf {
        self.root.join(job_id.as_str()).join(MARKDOWN_DIR)
    }

    pub fn batch_path(&self, job_id: &JobId, range: UnitRange) -> PathBuf {
        self.batch_dir(job_id)
            .join(format!("pages_{}.md", range.page_label()))
    }

    pub fn assembled_path(&self, job_id: &JobId) -> PathBuf {
        self.root
            .join(job_id.as_str())
            .join(format!("{}.md", job_id.as_str()))
    }

    async fn write_atomic(path: PathBuf, content: String) -> Result<(), BatchStoreError> {
        tokio::task::spawn_blocking(move || write_atomic_blocking(&path, content.as_bytes()))
            .await
            .map_err(|e| BatchStoreError::WriteFailed(format!("task join error: {e}")))?
            .map_err(BatchStoreError::Io)
    }
}

fn write_atomic_blocking(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| io::Error::other(format!("{} has no parent directory", path.display())))?;
    std::fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn parse_batch_file_name(name: &str) -> Option<UnitRange> {
    let captures = BATCH_FILE_NAME.captures(name)?;
    let first: usize = captures[1].parse().ok()?;
    let last: usize = captures[2].parse().ok()?;
    UnitRange::new(first.checked_sub(1)?, last.checked_sub(1)?).ok()
}

#[async_trait]
impl BatchStore for MarkdownBatchStore {
    async fn write(
        &self,
        job_id: &JobId,
        range: UnitRange,
        content: &str,
    ) -> Result<PathBuf, BatchStoreError> {
        if content.trim().is_empty() {
            return Err(BatchStoreError::EmptyContent(range.page_label()));
        }

        let path = self.batch_path(job_id, range);
        Self::write_atomic(path.clone(), content.to_string()).await?;
        Ok(path)
    }

    async fn list(&self, job_id: &JobId) -> Result<Vec<(UnitRange, PathBuf)>, BatchStoreError> {
        let dir = self.batch_dir(job_id);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(BatchStoreError::Io(e)),
        };

        let mut batches = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            match parse_batch_file_name(name) {
                Some(range) => batches.push((range, entry.path())),
                None => {
                    tracing::warn!(file = name, "Ignoring file that is not a batch output");
                }
            }
        }

        batches.sort_by_key(|(range, _)| *range);
        Ok(batches)
    }

    async fn read(&self, path: &Path) -> Result<String, BatchStoreError> {
        Ok(tokio::fs::read_to_string(path).await?)
    }

    async fn write_assembled(
        &self,
        job_id: &JobId,
        content: &str,
    ) -> Result<PathBuf, BatchStoreError> {
        let path = self.assembled_path(job_id);
        Self::write_atomic(path.clone(), content.to_string()).await?;
        Ok(path)
    }
}
