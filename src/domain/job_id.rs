use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Stable identity of one source document across restarts.
///
/// Used as a directory name by the file-backed ledger, so it may not contain
/// path separators, parent references or control characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId(String);

impl JobId {
    pub fn new(raw: impl Into<String>) -> Result<Self, JobIdError> {
        let raw = raw.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(JobIdError::Empty);
        }
        if trimmed == "." || trimmed == ".." || trimmed.contains("..") {
            return Err(JobIdError::InvalidCharacters(raw));
        }
        if trimmed
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_control())
        {
            return Err(JobIdError::InvalidCharacters(raw));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Derives the id from a local file's stem, e.g. `obits-1998.pdf` -> `obits-1998`.
    pub fn from_source_path(path: &Path) -> Result<Self, JobIdError> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| JobIdError::NoFileStem(path.display().to_string()))?;
        Self::new(stem)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for JobId {
    type Error = JobIdError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.0
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum JobIdError {
    #[error("job id must not be empty")]
    Empty,
    #[error("job id contains characters not allowed in a directory name: {0:?}")]
    InvalidCharacters(String),
    #[error("cannot derive a job id from path without a file stem: {0}")]
    NoFileStem(String),
}
