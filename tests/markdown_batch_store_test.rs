use pagemill::application::ports::{BatchStore, BatchStoreError};
use pagemill::domain::{JobId, UnitRange};
use pagemill::infrastructure::storage::MarkdownBatchStore;

fn job() -> JobId {
    JobId::new("gazette").unwrap()
}

fn range(start: usize, end: usize) -> UnitRange {
    UnitRange::new(start, end).unwrap()
}

fn create_test_store() -> (tempfile::TempDir, MarkdownBatchStore) {
    let dir = tempfile::TempDir::new().unwrap();
    let store = MarkdownBatchStore::new(dir.path());
    (dir, store)
}

#[tokio::test]
async fn given_empty_content_when_writing_then_refuses() {
    let (_dir, store) = create_test_store();

    let result = store.write(&job(), range(0, 9), "\n  \n").await;

    assert!(matches!(result, Err(BatchStoreError::EmptyContent(_))));
}

#[tokio::test]
async fn given_existing_batch_when_rewriting_then_content_is_replaced() {
    let (_dir, store) = create_test_store();

    store.write(&job(), range(0, 9), "first").await.unwrap();
    let path = store.write(&job(), range(0, 9), "second").await.unwrap();

    assert_eq!(store.read(&path).await.unwrap(), "second");
}

#[tokio::test]
async fn given_batches_written_out_of_order_when_listing_then_sorted_by_page() {
    let (_dir, store) = create_test_store();
    store.write(&job(), range(100, 109), "c").await.unwrap();
    store.write(&job(), range(0, 9), "a").await.unwrap();
    store.write(&job(), range(10, 19), "b").await.unwrap();

    let ranges: Vec<UnitRange> = store
        .list(&job())
        .await
        .unwrap()
        .into_iter()
        .map(|(r, _)| r)
        .collect();

    assert_eq!(ranges, vec![range(0, 9), range(10, 19), range(100, 109)]);
}

#[tokio::test]
async fn given_foreign_files_in_batch_dir_when_listing_then_they_are_ignored() {
    let (_dir, store) = create_test_store();
    store.write(&job(), range(0, 9), "a").await.unwrap();
    let batch_dir = store.batch_dir(&job());
    std::fs::write(batch_dir.join("notes.md"), "x").unwrap();
    std::fs::write(batch_dir.join("pages_0-3.md"), "x").unwrap();

    let listed = store.list(&job()).await.unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].0, range(0, 9));
}

#[tokio::test]
async fn given_unknown_job_when_listing_then_empty() {
    let (_dir, store) = create_test_store();

    assert!(store.list(&job()).await.unwrap().is_empty());
}

#[tokio::test]
async fn given_assembled_document_when_writing_then_lands_next_to_batches() {
    let (dir, store) = create_test_store();

    let path = store.write_assembled(&job(), "all pages").await.unwrap();

    assert_eq!(path, dir.path().join("gazette").join("gazette.md"));
    assert_eq!(std::fs::read_to_string(path).unwrap(), "all pages");
}
