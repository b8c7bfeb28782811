use convoscope_runtime::{
    Batch, IngestController, IngestFailure, IngestOutcome, IngestRun, IngestState, SessionMeta,
};
use convoscope_testing::{fixtures, lines};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn meta() -> SessionMeta {
    SessionMeta::new("session.jsonl", 1024).with_session_id(lines::SESSION_ID)
}

type Batches = Arc<Mutex<Vec<Batch>>>;

fn batch_sizes(batches: &Batches) -> Vec<usize> {
    batches
        .lock()
        .unwrap()
        .iter()
        .map(|batch| batch.records.len())
        .collect()
}

#[tokio::test]
async fn test_flushes_full_and_final_batches() {
    let controller = IngestController::new(50);
    let mut sizes = Vec::new();

    let outcome = controller
        .start(fixtures::numbered_session(60), meta())
        .run(|batch| sizes.push(batch.records.len()))
        .await;

    assert_eq!(sizes, [50, 10]);
    match outcome {
        IngestOutcome::Completed { total, meta, stats } => {
            assert_eq!(total, 60);
            assert_eq!(meta.record_count, 60);
            assert_eq!(meta.file_name, "session.jsonl");
            assert_eq!(meta.file_size, 1024);
            assert_eq!(meta.session_id.as_deref(), Some(lines::SESSION_ID));
            assert_eq!(stats.accepted, 60);
            assert_eq!(stats.total_lines, 60);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(controller.state(), IngestState::Idle);
}

#[tokio::test]
async fn test_blank_lines_are_not_skips() {
    let valid = lines::assistant_text("a1", "m1", "hi");
    let text = format!("not json\n\n   \n{}", valid);
    let controller = IngestController::new(50);
    let mut batches = Vec::new();

    let outcome = controller.start(text, meta()).run(|b| batches.push(b)).await;

    let stats = *outcome.stats();
    assert_eq!(stats.accepted, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.blank, 2);
    assert_eq!(stats.accepted + stats.skipped + stats.blank, stats.total_lines);
    assert!(matches!(outcome, IngestOutcome::Completed { total: 1, .. }));

    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].records.len(), 1);
    assert_eq!(batches[0].skipped, 1);
}

#[tokio::test]
async fn test_empty_input_fails() {
    for text in ["", "   \n\t\n  "] {
        let controller = IngestController::new(50);
        let mut batches = 0;
        let outcome = controller.start(text, meta()).run(|_| batches += 1).await;

        let IngestOutcome::Failed { failure, stats } = outcome else {
            panic!("expected failure for {:?}", text);
        };
        assert_eq!(failure, IngestFailure::Empty);
        assert_eq!(failure.to_string(), "empty input");
        assert_eq!(stats.accepted, 0);
        assert_eq!(batches, 0);
    }
}

#[tokio::test]
async fn test_no_valid_records_fails() {
    let text = "garbage\n{\"type\":\"system\",\"uuid\":\"s1\"}\n[1,2]\n";
    let controller = IngestController::new(50);
    let mut batches = Vec::new();

    let outcome = controller.start(text, meta()).run(|b| batches.push(b)).await;

    let IngestOutcome::Failed { failure, stats } = outcome else {
        panic!("expected failure");
    };
    assert_eq!(failure, IngestFailure::NoValidRecords);
    assert_eq!(failure.to_string(), "no valid records found");
    assert_eq!(stats.skipped, 3);
    // skips are still reported downstream
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].skipped, 3);
}

#[tokio::test(start_paused = true)]
async fn test_pause_and_resume() {
    let controller = IngestController::new(50);
    let batches: Batches = Arc::default();

    let sink = batches.clone();
    let pauser = controller.clone();
    let run = controller.start(fixtures::numbered_session(120), meta());
    let handle = tokio::spawn(run.run(move |batch| {
        let mut sink = sink.lock().unwrap();
        if sink.is_empty() {
            pauser.pause().unwrap();
        }
        sink.push(batch);
    }));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(controller.state(), IngestState::Paused);
    assert_eq!(batch_sizes(&batches), [50]);

    controller.resume().unwrap();
    let outcome = handle.await.unwrap();

    assert!(matches!(outcome, IngestOutcome::Completed { total: 120, .. }));
    assert_eq!(batch_sizes(&batches), [50, 50, 20]);
}

#[tokio::test]
async fn test_abort_keeps_flushed_batches() {
    let controller = IngestController::new(50);
    let aborter = controller.clone();
    let mut sizes = Vec::new();

    let outcome = controller
        .start(fixtures::numbered_session(120), meta())
        .run(|batch| {
            sizes.push(batch.records.len());
            aborter.abort().unwrap();
        })
        .await;

    assert_eq!(sizes, [50]);
    let IngestOutcome::Aborted { stats } = outcome else {
        panic!("expected abort");
    };
    assert_eq!(stats.accepted, 50);
    assert_eq!(controller.state(), IngestState::Aborted);
}

#[tokio::test]
async fn test_abort_from_last_batch_is_not_completion() {
    let controller = IngestController::new(50);
    let aborter = controller.clone();
    let mut sizes = Vec::new();

    let outcome = controller
        .start(fixtures::numbered_session(10), meta())
        .run(|batch| {
            sizes.push(batch.records.len());
            aborter.abort().unwrap();
        })
        .await;

    assert_eq!(sizes, [10]);
    assert!(matches!(outcome, IngestOutcome::Aborted { .. }));
    assert_eq!(controller.state(), IngestState::Aborted);
    assert!(controller.resume().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_pause_from_last_batch_holds_completion() {
    let controller = IngestController::new(50);
    let pauser = controller.clone();
    let batches: Batches = Arc::default();

    let sink = batches.clone();
    let run = controller.start(fixtures::numbered_session(10), meta());
    let handle = tokio::spawn(run.run(move |batch| {
        sink.lock().unwrap().push(batch);
        pauser.pause().unwrap();
    }));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!handle.is_finished());
    assert_eq!(controller.state(), IngestState::Paused);
    assert_eq!(batch_sizes(&batches), [10]);

    controller.resume().unwrap();
    let outcome = handle.await.unwrap();

    assert!(matches!(outcome, IngestOutcome::Completed { total: 10, .. }));
    assert_eq!(batch_sizes(&batches), [10]);
    assert_eq!(controller.state(), IngestState::Idle);
    assert!(controller.resume().is_err());
}

#[tokio::test]
async fn test_dropped_controller_ends_paused_run() {
    let controller = IngestController::new(10);
    let run = controller.start(fixtures::numbered_session(30), meta());
    controller.pause().unwrap();
    drop(controller);

    let outcome = run.run(|_| {}).await;
    assert!(matches!(outcome, IngestOutcome::Aborted { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_abort_while_paused() {
    let controller = IngestController::new(10);
    let run = controller.start(fixtures::numbered_session(30), meta());
    controller.pause().unwrap();

    let handle = tokio::spawn(run.run(|_| {}));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!handle.is_finished());

    controller.abort().unwrap();
    let outcome = handle.await.unwrap();
    assert!(matches!(outcome, IngestOutcome::Aborted { .. }));
    assert_eq!(outcome.stats().total_lines, 0);
}

#[tokio::test]
async fn test_new_start_supersedes_running() {
    let controller = IngestController::new(50);
    let next: Arc<Mutex<Option<IngestRun>>> = Arc::default();

    let restarter = controller.clone();
    let slot = next.clone();
    let mut sizes = Vec::new();
    let outcome = controller
        .start(fixtures::numbered_session(120), meta())
        .run(|batch| {
            sizes.push(batch.records.len());
            let mut slot = slot.lock().unwrap();
            if slot.is_none() {
                *slot = Some(restarter.start(fixtures::numbered_session(5), meta()));
            }
        })
        .await;

    assert_eq!(sizes, [50]);
    assert!(matches!(outcome, IngestOutcome::Aborted { .. }));

    let second = next.lock().unwrap().take().expect("second run started");
    assert_eq!(second.generation(), 2);
    let outcome = second.run(|_| {}).await;
    assert!(matches!(outcome, IngestOutcome::Completed { total: 5, .. }));
    assert_eq!(controller.state(), IngestState::Idle);
}
