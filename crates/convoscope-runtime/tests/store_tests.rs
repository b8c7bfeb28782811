use anyhow::Result;
use convoscope_runtime::{
    Batch, Config, IngestController, IngestOutcome, SessionMeta, SessionStore, load_session,
};
use convoscope_testing::fixtures;

#[tokio::test]
async fn test_store_ingests_nested_session() {
    let controller = IngestController::new(4);
    let mut store = SessionStore::new();

    let outcome = store
        .ingest(controller.start(fixtures::nested_session(), SessionMeta::new("nested.jsonl", 0)))
        .await;

    assert!(outcome.is_completed());
    assert_eq!(store.records().len(), 10);
    assert_eq!(store.batches(), 3);
    assert_eq!(store.skipped(), 0);
    assert_eq!(store.meta().map(|meta| meta.record_count), Some(10));

    let snapshot = store.snapshot();
    assert_eq!(snapshot.turns.len(), 4);
    assert_eq!(snapshot.search("needle").matched_keys, ["m1"]);
    assert_eq!(snapshot.summary().subagents, 2);
}

#[tokio::test]
async fn test_subscribers_see_provisional_snapshots() {
    let controller = IngestController::new(4);
    let mut store = SessionStore::new();
    let mut snapshots = store.subscribe();
    let run = controller.start(fixtures::nested_session(), SessionMeta::new("nested.jsonl", 0));

    let handle = tokio::spawn(async move {
        store.ingest(run).await;
        store
    });

    snapshots.changed().await.unwrap();
    let provisional = snapshots.borrow_and_update().index.record_count();
    // the first full batch is published before the driver yields
    assert!((1..10).contains(&provisional), "saw {provisional} records mid-run");

    let store = handle.await.unwrap();
    assert!(store.is_complete());
    assert_eq!(snapshots.borrow().index.record_count(), 10);
    assert_eq!(**snapshots.borrow(), *store.snapshot());
}

#[test]
fn test_snapshot_is_rebuilt_per_batch() {
    let records = convoscope_parser::parse_text(&fixtures::numbered_session(8)).records;
    let mut store = SessionStore::new();

    store.apply(Batch {
        records: records[..5].to_vec(),
        skipped: 2,
    });
    assert_eq!(store.snapshot().turns.len(), 5);
    assert!(!store.is_complete());

    store.apply(Batch {
        records: records[5..].to_vec(),
        skipped: 0,
    });
    assert_eq!(store.snapshot().turns.len(), 8);
    assert_eq!(store.skipped(), 2);

    store.reset();
    assert!(store.snapshot().is_empty());
    assert_eq!(store.skipped(), 0);
}

#[tokio::test]
async fn test_failed_ingest_leaves_no_meta() {
    let mut store = SessionStore::new();
    let outcome = store
        .ingest(IngestController::default().start("nope\n", SessionMeta::new("bad.jsonl", 5)))
        .await;

    assert!(matches!(outcome, IngestOutcome::Failed { .. }));
    assert!(store.meta().is_none());
    assert_eq!(store.skipped(), 1);
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn test_load_session_from_file() -> Result<()> {
    let text = fixtures::nested_session();
    let file = fixtures::temp_log(&text)?;

    let (store, outcome) = load_session(file.path(), &Config::default()).await?;

    assert!(outcome.is_completed());
    let meta = store.meta().expect("completed run has meta");
    assert!(meta.file_name.ends_with(".jsonl"));
    assert_eq!(meta.file_size, text.len() as u64);
    assert_eq!(meta.record_count, 10);
    Ok(())
}

#[tokio::test]
async fn test_load_missing_file() {
    let err = load_session(std::path::Path::new("/nonexistent/x.jsonl"), &Config::default())
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("IO error"));
}
