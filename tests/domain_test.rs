use std::path::Path;

use pagemill::domain::{
    JobId, JobIdError, LedgerEntry, RangeFailure, RangeOutcome, RangeResult, RunReport, UnitRange,
    UnitRangeError, partition,
};

fn range(start: usize, end: usize) -> UnitRange {
    UnitRange::new(start, end).unwrap()
}

#[test]
fn given_25_units_and_batch_of_10_when_partitioning_then_produces_three_inclusive_ranges() {
    let ranges = partition(25, 10).unwrap();

    assert_eq!(ranges, vec![range(0, 9), range(10, 19), range(20, 24)]);
}

#[test]
fn given_any_sizes_when_partitioning_then_ranges_cover_every_unit_exactly_once() {
    for total in 1..=40 {
        for batch_size in 1..=12 {
            let ranges = partition(total, batch_size).unwrap();

            let mut expected_start = 0;
            for (i, r) in ranges.iter().enumerate() {
                assert_eq!(r.start(), expected_start, "total={total} batch={batch_size}");
                if i + 1 < ranges.len() {
                    assert_eq!(r.len(), batch_size);
                } else {
                    assert!(r.len() <= batch_size);
                }
                expected_start = r.end() + 1;
            }
            assert_eq!(expected_start, total);
        }
    }
}

#[test]
fn given_zero_units_when_partitioning_then_no_ranges() {
    assert!(partition(0, 10).unwrap().is_empty());
}

#[test]
fn given_zero_batch_size_when_partitioning_then_rejected() {
    assert_eq!(partition(10, 0), Err(UnitRangeError::ZeroBatchSize));
}

#[test]
fn given_inverted_bounds_when_creating_range_then_rejected() {
    assert_eq!(
        UnitRange::new(5, 4),
        Err(UnitRangeError::Inverted { start: 5, end: 4 })
    );
}

#[test]
fn given_range_when_labelling_then_uses_one_based_pages() {
    assert_eq!(range(10, 19).page_label(), "11-20");
    assert_eq!(range(10, 19).len(), 10);
}

#[test]
fn given_file_path_when_deriving_job_id_then_uses_file_stem() {
    let job_id = JobId::from_source_path(Path::new("/scans/obituaries-1998.pdf")).unwrap();

    assert_eq!(job_id.as_str(), "obituaries-1998");
}

#[test]
fn given_unsafe_job_ids_when_creating_then_rejected() {
    assert_eq!(JobId::new("  "), Err(JobIdError::Empty));
    assert!(matches!(
        JobId::new("../etc"),
        Err(JobIdError::InvalidCharacters(_))
    ));
    assert!(matches!(
        JobId::new("a/b"),
        Err(JobIdError::InvalidCharacters(_))
    ));
    assert!(JobId::new("1AbC_drive-id").is_ok());
}

#[test]
fn given_ledger_entry_when_recording_same_range_twice_then_second_is_noop() {
    let mut entry = LedgerEntry::empty(JobId::new("job").unwrap());

    assert!(entry.record(range(0, 9)));
    let first_update = entry.updated_at;
    assert!(!entry.record(range(0, 9)));

    assert_eq!(entry.completed.len(), 1);
    assert_eq!(entry.updated_at, first_update);
}

#[test]
fn given_ledger_entry_when_serialized_then_ranges_are_boundary_pairs() {
    let mut entry = LedgerEntry::empty(JobId::new("job").unwrap());
    entry.record(range(10, 19));
    entry.record(range(0, 9));

    let json = serde_json::to_value(&entry).unwrap();

    assert_eq!(json["job_id"], "job");
    assert_eq!(json["completed"], serde_json::json!([[0, 9], [10, 19]]));
}

#[test]
fn given_inverted_pair_in_record_when_deserializing_then_fails() {
    let json = r#"{"job_id":"job","completed":[[9,0]]}"#;

    assert!(serde_json::from_str::<LedgerEntry>(json).is_err());
}

#[test]
fn given_unordered_results_when_building_report_then_sorted_by_range_start() {
    let job_id = JobId::new("job").unwrap();
    let report = RunReport::new(
        job_id,
        vec![
            RangeResult {
                range: range(20, 24),
                outcome: RangeOutcome::Succeeded(()),
            },
            RangeResult {
                range: range(0, 9),
                outcome: RangeOutcome::Skipped,
            },
            RangeResult {
                range: range(10, 19),
                outcome: RangeOutcome::Failed(RangeFailure::Unit("boom".to_string())),
            },
        ],
    );

    let starts: Vec<usize> = report.results().iter().map(|r| r.range.start()).collect();
    assert_eq!(starts, vec![0, 10, 20]);

    let summary = report.summary();
    assert_eq!((summary.skipped, summary.succeeded, summary.failed), (1, 1, 1));
    assert!(!summary.is_complete());
    assert_eq!(report.failed_ranges().count(), 1);
}
