use convoscope_engine::Snapshot;
use convoscope_types::SharedRecord;
use std::sync::Arc;
use tokio::sync::watch;

use crate::ingest::{Batch, IngestOutcome, IngestRun, SessionMeta};

/// Accumulates flushed batches and keeps the derived snapshot current.
///
/// The snapshot is rebuilt from the full record list after every batch; while
/// a run is still going it is provisional. [`SessionStore::subscribe`] hands
/// out receivers that see each rebuilt snapshot, including during a run.
#[derive(Debug)]
pub struct SessionStore {
    records: Vec<SharedRecord>,
    skipped: usize,
    batches: usize,
    snapshot: Arc<Snapshot>,
    published: watch::Sender<Arc<Snapshot>>,
    meta: Option<SessionMeta>,
}

impl Default for SessionStore {
    fn default() -> Self {
        let snapshot = Arc::new(Snapshot::default());
        let (published, _) = watch::channel(snapshot.clone());
        Self {
            records: Vec::new(),
            skipped: 0,
            batches: 0,
            snapshot,
            published,
            meta: None,
        }
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all records and derived state. Subscribers see the empty snapshot.
    pub fn reset(&mut self) {
        self.records.clear();
        self.skipped = 0;
        self.batches = 0;
        self.meta = None;
        self.publish(Snapshot::default());
    }

    /// Receiver of every snapshot this store publishes from now on.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.published.subscribe()
    }

    fn publish(&mut self, snapshot: Snapshot) {
        self.snapshot = Arc::new(snapshot);
        self.published.send_replace(self.snapshot.clone());
    }

    pub fn apply(&mut self, batch: Batch) {
        self.skipped += batch.skipped;
        self.batches += 1;
        if batch.records.is_empty() {
            return;
        }
        self.records
            .extend(batch.records.into_iter().map(Arc::new));
        let snapshot = Snapshot::build(&self.records);
        self.publish(snapshot);
    }

    /// Reset, then drive `run` to its end while applying each batch.
    pub async fn ingest(&mut self, run: IngestRun) -> IngestOutcome {
        self.reset();
        let outcome = run.run(|batch| self.apply(batch)).await;
        if let IngestOutcome::Completed { meta, .. } = &outcome {
            self.meta = Some(meta.clone());
        }
        outcome
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn records(&self) -> &[SharedRecord] {
        &self.records
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn batches(&self) -> usize {
        self.batches
    }

    /// Set once a run completes; `None` while provisional or after a failure.
    pub fn meta(&self) -> Option<&SessionMeta> {
        self.meta.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.meta.is_some()
    }
}
