use std::path::PathBuf;

use super::UnitRange;

/// Result of extracting one range: where its markdown landed and how much text it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedBatch {
    pub range: UnitRange,
    pub output_path: PathBuf,
    pub characters: usize,
}
