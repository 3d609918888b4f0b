use std::fmt;

use serde::{Deserialize, Serialize};

/// A contiguous batch of zero-based page indices. Both bounds are inclusive.
///
/// Ordering is by `start`, then `end`, which for ranges produced by
/// [`partition`] is the same as document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "[usize; 2]", try_from = "[usize; 2]")]
pub struct UnitRange {
    start: usize,
    end: usize,
}

impl UnitRange {
    pub fn new(start: usize, end: usize) -> Result<Self, UnitRangeError> {
        if start > end {
            return Err(UnitRangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Always false; a range holds at least one unit.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn pages(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }

    /// One-based page label used in logs and output file names, e.g. `11-20`.
    pub fn page_label(&self) -> String {
        format!("{}-{}", self.start + 1, self.end + 1)
    }
}

impl fmt::Display for UnitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

impl From<UnitRange> for [usize; 2] {
    fn from(range: UnitRange) -> Self {
        [range.start, range.end]
    }
}

impl TryFrom<[usize; 2]> for UnitRange {
    type Error = UnitRangeError;

    fn try_from([start, end]: [usize; 2]) -> Result<Self, Self::Error> {
        Self::new(start, end)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UnitRangeError {
    #[error("range start {start} is after end {end}")]
    Inverted { start: usize, end: usize },
    #[error("batch size must be at least 1")]
    ZeroBatchSize,
}

/// Splits `[0, total_units - 1]` into consecutive ranges of `batch_size` units.
///
/// Range `i` is `[i * batch_size, min((i + 1) * batch_size - 1, total_units - 1)]`;
/// only the last range may be shorter. `total_units == 0` yields no ranges.
pub fn partition(total_units: usize, batch_size: usize) -> Result<Vec<UnitRange>, UnitRangeError> {
    if batch_size == 0 {
        return Err(UnitRangeError::ZeroBatchSize);
    }

    let ranges = (0..total_units)
        .step_by(batch_size)
        .map(|start| UnitRange {
            start,
            end: start.saturating_add(batch_size - 1).min(total_units - 1),
        })
        .collect();

    Ok(ranges)
}
