use std::collections::BTreeSet;
use std::fmt::Write;

use crate::domain::{ExtractedBatch, RangeOutcome, RunReport, UnitRange};

/// Human-readable table of a run, one line per range in page order.
pub fn render_run_report(report: &RunReport<ExtractedBatch>) -> String {
    let mut out = String::new();
    let summary = report.summary();

    let _ = writeln!(out, "job {}", report.job_id);
    for result in report.results() {
        let pages = format!("pages {}", result.range.page_label());
        let _ = match &result.outcome {
            RangeOutcome::Skipped => writeln!(out, "  {pages:<16} skipped (already complete)"),
            RangeOutcome::Succeeded(batch) => writeln!(
                out,
                "  {pages:<16} done    {} chars -> {}",
                batch.characters,
                batch.output_path.display()
            ),
            RangeOutcome::Failed(failure) => writeln!(out, "  {pages:<16} FAILED  {failure}"),
        };
    }
    let _ = writeln!(
        out,
        "{} skipped, {} succeeded, {} failed",
        summary.skipped, summary.succeeded, summary.failed
    );
    if !summary.is_complete() {
        let _ = writeln!(out, "re-run the same command to retry failed batches");
    }

    out
}

/// Completed/pending view of a job's ranges against its ledger.
pub fn render_status(
    job_id: &str,
    ranges: &[UnitRange],
    completed: &BTreeSet<UnitRange>,
) -> String {
    let mut out = String::new();
    let done = ranges.iter().filter(|r| completed.contains(r)).count();

    let _ = writeln!(out, "job {job_id}: {done}/{} batches complete", ranges.len());
    for range in ranges {
        let state = if completed.contains(range) {
            "complete"
        } else {
            "pending"
        };
        let _ = writeln!(out, "  pages {:<16} {state}", range.page_label());
    }

    let stray = completed.iter().filter(|r| !ranges.contains(r)).count();
    if stray > 0 {
        let _ = writeln!(
            out,
            "{stray} recorded batch(es) do not match the current batch size and will be redone"
        );
    }

    out
}
