use std::collections::BTreeSet;
use std::sync::Arc;

use pagemill::application::ports::{LedgerError, ProgressLedger};
use pagemill::domain::{JobId, LedgerEntry, UnitRange};
use pagemill::infrastructure::persistence::{FileProgressLedger, LEDGER_FILE_NAME};

fn job(name: &str) -> JobId {
    JobId::new(name).unwrap()
}

fn range(start: usize, end: usize) -> UnitRange {
    UnitRange::new(start, end).unwrap()
}

fn create_test_ledger() -> (tempfile::TempDir, FileProgressLedger) {
    let dir = tempfile::TempDir::new().unwrap();
    let ledger = FileProgressLedger::new(dir.path());
    (dir, ledger)
}

#[tokio::test]
async fn given_no_record_when_loading_then_returns_empty_set() {
    let (_dir, ledger) = create_test_ledger();

    let completed = ledger.load(&job("fresh")).await.unwrap();

    assert!(completed.is_empty());
}

#[tokio::test]
async fn given_marked_range_when_loading_from_new_instance_then_range_is_present() {
    let (dir, ledger) = create_test_ledger();
    ledger.mark_complete(&job("doc"), range(0, 9)).await.unwrap();

    let reopened = FileProgressLedger::new(dir.path());
    let completed = reopened.load(&job("doc")).await.unwrap();

    assert_eq!(completed, BTreeSet::from([range(0, 9)]));
    assert!(reopened.is_complete(&job("doc"), range(0, 9)).await.unwrap());
    assert!(!reopened.is_complete(&job("doc"), range(10, 19)).await.unwrap());
}

#[tokio::test]
async fn given_marked_range_when_inspecting_file_then_record_is_job_scoped_json() {
    let (dir, ledger) = create_test_ledger();
    ledger.mark_complete(&job("doc"), range(10, 19)).await.unwrap();
    ledger.mark_complete(&job("doc"), range(0, 9)).await.unwrap();

    let path = dir.path().join("doc").join(LEDGER_FILE_NAME);
    assert_eq!(ledger.record_path(&job("doc")), path);

    let entry: LedgerEntry = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(entry.job_id, job("doc"));
    assert_eq!(
        entry.completed.into_iter().collect::<Vec<_>>(),
        vec![range(0, 9), range(10, 19)]
    );
    assert!(entry.updated_at.is_some());
}

#[tokio::test]
async fn given_same_range_marked_twice_when_loading_then_recorded_once() {
    let (_dir, ledger) = create_test_ledger();

    ledger.mark_complete(&job("doc"), range(0, 9)).await.unwrap();
    ledger.mark_complete(&job("doc"), range(0, 9)).await.unwrap();

    assert_eq!(ledger.load(&job("doc")).await.unwrap().len(), 1);
}

#[tokio::test]
async fn given_two_jobs_when_marking_then_records_are_independent() {
    let (_dir, ledger) = create_test_ledger();

    ledger.mark_complete(&job("a"), range(0, 9)).await.unwrap();
    ledger.mark_complete(&job("b"), range(10, 19)).await.unwrap();

    assert_eq!(
        ledger.load(&job("a")).await.unwrap(),
        BTreeSet::from([range(0, 9)])
    );
    assert_eq!(
        ledger.load(&job("b")).await.unwrap(),
        BTreeSet::from([range(10, 19)])
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_concurrent_marks_for_same_job_when_loading_then_no_range_is_lost() {
    let (_dir, ledger) = create_test_ledger();
    let ledger = Arc::new(ledger);

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let ledger = Arc::clone(&ledger);
            tokio::spawn(async move {
                ledger
                    .mark_complete(&job("shared"), range(i * 10, i * 10 + 9))
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let completed = ledger.load(&job("shared")).await.unwrap();
    assert_eq!(completed.len(), 32);
}

#[tokio::test]
async fn given_unparsable_record_when_loading_then_reports_corrupt() {
    let (_dir, ledger) = create_test_ledger();
    let path = ledger.record_path(&job("doc"));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"not json").unwrap();

    let result = ledger.load(&job("doc")).await;

    assert!(matches!(result, Err(LedgerError::Corrupt { .. })));
}

#[tokio::test]
async fn given_inverted_range_in_record_when_loading_then_reports_corrupt() {
    let (_dir, ledger) = create_test_ledger();
    let path = ledger.record_path(&job("doc"));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, br#"{"job_id":"doc","completed":[[19,10]]}"#).unwrap();

    let result = ledger.load(&job("doc")).await;

    assert!(matches!(result, Err(LedgerError::Corrupt { .. })));
}

#[tokio::test]
async fn given_record_of_another_job_when_loading_then_reports_corrupt() {
    let (_dir, ledger) = create_test_ledger();
    let path = ledger.record_path(&job("doc"));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, br#"{"job_id":"other","completed":[[0,9]]}"#).unwrap();

    let result = ledger.load(&job("doc")).await;

    assert!(matches!(result, Err(LedgerError::Corrupt { .. })));
}

#[tokio::test]
async fn given_corrupt_record_when_marking_then_fails_without_overwriting() {
    let (_dir, ledger) = create_test_ledger();
    let path = ledger.record_path(&job("doc"));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"garbage").unwrap();

    let result = ledger.mark_complete(&job("doc"), range(0, 9)).await;

    assert!(result.is_err());
    assert_eq!(std::fs::read(&path).unwrap(), b"garbage");
}

#[tokio::test]
async fn given_file_in_place_of_job_directory_when_marking_then_reports_persist_failure() {
    let (_dir, ledger) = create_test_ledger();
    let path = ledger.record_path(&job("doc"));
    let job_dir = path.parent().unwrap();
    std::fs::write(job_dir, b"not a directory").unwrap();

    let result = ledger.mark_complete(&job("doc"), range(0, 9)).await;

    assert!(matches!(result, Err(LedgerError::PersistFailure { .. })));
    assert_eq!(std::fs::read(job_dir).unwrap(), b"not a directory");
}

#[cfg(unix)]
#[tokio::test]
async fn given_unwritable_job_directory_when_marking_then_reports_persist_failure() {
    use std::os::unix::fs::PermissionsExt;

    let (_dir, ledger) = create_test_ledger();
    let path = ledger.record_path(&job("doc"));
    let job_dir = path.parent().unwrap();
    std::fs::create_dir_all(job_dir).unwrap();
    std::fs::set_permissions(job_dir, std::fs::Permissions::from_mode(0o555)).unwrap();

    // Permission bits are not enforced for root.
    if tempfile::NamedTempFile::new_in(job_dir).is_ok() {
        return;
    }

    let result = ledger.mark_complete(&job("doc"), range(0, 9)).await;
    std::fs::set_permissions(job_dir, std::fs::Permissions::from_mode(0o755)).unwrap();

    assert!(matches!(result, Err(LedgerError::PersistFailure { .. })));
}
