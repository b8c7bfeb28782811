//! Cooperative, pausable ingestion of a whole session log.
//!
//! [`IngestController`] is the control handle: `start` opens a new run and
//! `pause` / `resume` / `abort` move it through an explicit state machine:
//!
//! ```text
//!            start               pause
//!   Idle ───────────▶ Running ───────────▶ Paused
//!    ▲                 │   ▲    resume       │
//!    │   completion    │   └─────────────────┘
//!    └─────────────────┤
//!                      │ abort (from Running or Paused)
//!                      ▼
//!                   Aborted
//! ```
//!
//! [`IngestRun`] owns the input text and its continuation point (byte offset of
//! the next unprocessed line). Driving it with [`IngestRun::run`] parses line by
//! line, flushes a [`Batch`] every `batch_size` accepted records and yields to
//! the scheduler after each flush. Control requests are observed between lines.

use chrono::{DateTime, Utc};
use convoscope_parser::{LineOutcome, ParseStats, parse_line};
use convoscope_types::Record;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Weak};
use tokio::sync::watch;

use crate::config::IngestConfig;
use crate::{Error, Result};

/// Line accounting of one run: `accepted + skipped + blank == total_lines`.
pub type IngestStats = ParseStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestState {
    Idle,
    Running,
    Paused,
    /// Terminal for the run it stopped; a new `start` leaves it
    Aborted,
}

impl fmt::Display for IngestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IngestState::Idle => "idle",
            IngestState::Running => "running",
            IngestState::Paused => "paused",
            IngestState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Records and skip count accumulated since the previous flush.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub records: Vec<Record>,
    pub skipped: usize,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.skipped == 0
    }
}

/// Descriptor of a loaded session, passed through ingestion untouched except
/// for `record_count`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionMeta {
    pub file_name: String,
    pub file_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub loaded_at: DateTime<Utc>,
    pub record_count: usize,
}

impl SessionMeta {
    pub fn new(file_name: impl Into<String>, file_size: u64) -> Self {
        Self {
            file_name: file_name.into(),
            file_size,
            session_id: None,
            loaded_at: Utc::now(),
            record_count: 0,
        }
    }

    /// Metadata of a file on disk; `loaded_at` is now.
    pub fn for_file(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(file_name, metadata.len()))
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Whole-input failures. Per-line rejections never end a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestFailure {
    /// The text was empty or whitespace only
    Empty,
    /// Non-blank text without a single valid record
    NoValidRecords,
}

impl fmt::Display for IngestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestFailure::Empty => write!(f, "empty input"),
            IngestFailure::NoValidRecords => write!(f, "no valid records found"),
        }
    }
}

impl std::error::Error for IngestFailure {}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IngestOutcome {
    Completed {
        /// Valid records produced across the run
        total: usize,
        meta: SessionMeta,
        stats: IngestStats,
    },
    Failed {
        failure: IngestFailure,
        stats: IngestStats,
    },
    /// Stopped by `abort` or superseded by a newer `start`; flushed batches stand
    Aborted { stats: IngestStats },
}

impl IngestOutcome {
    pub fn stats(&self) -> &IngestStats {
        match self {
            IngestOutcome::Completed { stats, .. }
            | IngestOutcome::Failed { stats, .. }
            | IngestOutcome::Aborted { stats } => stats,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, IngestOutcome::Completed { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Control {
    generation: u64,
    state: IngestState,
}

/// Control handle shared between the driver and whoever issues commands.
#[derive(Debug, Clone)]
pub struct IngestController {
    control: Arc<watch::Sender<Control>>,
    batch_size: usize,
}

impl IngestController {
    pub fn new(batch_size: usize) -> Self {
        let (control, _) = watch::channel(Control {
            generation: 0,
            state: IngestState::Idle,
        });
        Self {
            control: Arc::new(control),
            batch_size: batch_size.max(1),
        }
    }

    pub fn from_config(config: &IngestConfig) -> Self {
        Self::new(config.effective_batch_size())
    }

    pub fn state(&self) -> IngestState {
        self.control.borrow().state
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Open a new run over `text`. Allowed in any state: a run still in
    /// flight is superseded and stops at its next line boundary.
    pub fn start(&self, text: impl Into<String>, meta: SessionMeta) -> IngestRun {
        let mut generation = 0;
        self.control.send_modify(|control| {
            control.generation += 1;
            control.state = IngestState::Running;
            generation = control.generation;
        });
        tracing::debug!(generation, file = %meta.file_name, "ingestion started");

        IngestRun {
            text: text.into(),
            cursor: 0,
            batch: Vec::new(),
            pending_skips: 0,
            produced: 0,
            stats: IngestStats::default(),
            batch_size: self.batch_size,
            generation,
            control: self.control.subscribe(),
            controller: Arc::downgrade(&self.control),
            meta,
        }
    }

    pub fn pause(&self) -> Result<()> {
        self.transition("pause", |state| match state {
            IngestState::Running => Some(IngestState::Paused),
            _ => None,
        })
    }

    pub fn resume(&self) -> Result<()> {
        self.transition("resume", |state| match state {
            IngestState::Paused => Some(IngestState::Running),
            _ => None,
        })
    }

    pub fn abort(&self) -> Result<()> {
        self.transition("abort", |state| match state {
            IngestState::Running | IngestState::Paused => Some(IngestState::Aborted),
            _ => None,
        })
    }

    fn transition(
        &self,
        action: &'static str,
        next: impl FnOnce(IngestState) -> Option<IngestState>,
    ) -> Result<()> {
        let mut rejected = None;
        self.control.send_if_modified(|control| match next(control.state) {
            Some(state) => {
                control.state = state;
                true
            }
            None => {
                rejected = Some(control.state);
                false
            }
        });

        match rejected {
            Some(state) => Err(Error::InvalidTransition { state, action }),
            None => {
                tracing::debug!(action, "ingestion control");
                Ok(())
            }
        }
    }
}

impl Default for IngestController {
    fn default() -> Self {
        Self::from_config(&IngestConfig::default())
    }
}

enum Checkpoint {
    Continue,
    Stop,
}

/// One ingestion pass. Created by [`IngestController::start`].
pub struct IngestRun {
    text: String,
    /// Byte offset of the next unprocessed line
    cursor: usize,
    batch: Vec<Record>,
    pending_skips: usize,
    produced: usize,
    stats: IngestStats,
    batch_size: usize,
    generation: u64,
    control: watch::Receiver<Control>,
    /// Weak so that dropping every controller handle ends a paused run
    controller: Weak<watch::Sender<Control>>,
    meta: SessionMeta,
}

impl IngestRun {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    /// Drive the run to its end, handing each flushed batch to `on_batch`.
    pub async fn run(mut self, mut on_batch: impl FnMut(Batch)) -> IngestOutcome {
        loop {
            if let Checkpoint::Stop = self.checkpoint(&mut on_batch).await {
                tracing::debug!(
                    generation = self.generation,
                    accepted = self.stats.accepted,
                    "ingestion stopped"
                );
                return IngestOutcome::Aborted { stats: self.stats };
            }

            if !self.advance() {
                break;
            }

            if self.batch.len() >= self.batch_size {
                self.flush(&mut on_batch);
                tokio::task::yield_now().await;
            }
        }

        self.flush(&mut on_batch);

        // The last callback may itself have paused or aborted the run
        if let Checkpoint::Stop = self.checkpoint(&mut on_batch).await {
            tracing::debug!(generation = self.generation, "ingestion stopped after last batch");
            return IngestOutcome::Aborted { stats: self.stats };
        }
        self.finish()
    }

    /// Consume one line. Returns false once the text is exhausted.
    fn advance(&mut self) -> bool {
        if self.cursor >= self.text.len() {
            return false;
        }

        let rest = &self.text[self.cursor..];
        let (line, consumed) = match rest.find('\n') {
            Some(end) => (&rest[..end], end + 1),
            None => (rest, rest.len()),
        };
        let outcome = parse_line(line);
        self.cursor += consumed;
        self.stats.observe(&outcome);

        match outcome {
            LineOutcome::Record(record) => self.batch.push(record),
            LineOutcome::Rejected(reason) => {
                tracing::trace!(line = self.stats.total_lines, %reason, "skipping line");
                self.pending_skips += 1;
            }
            LineOutcome::Blank => {}
        }
        true
    }

    /// Observe control state at a line boundary, parking while paused.
    async fn checkpoint(&mut self, on_batch: &mut impl FnMut(Batch)) -> Checkpoint {
        loop {
            let control = *self.control.borrow_and_update();
            if control.generation != self.generation {
                return Checkpoint::Stop;
            }

            match control.state {
                IngestState::Running => return Checkpoint::Continue,
                IngestState::Idle | IngestState::Aborted => return Checkpoint::Stop,
                IngestState::Paused => {
                    self.flush(on_batch);
                    if self.control.changed().await.is_err() {
                        tracing::debug!(
                            generation = self.generation,
                            "controller dropped while paused"
                        );
                        return Checkpoint::Stop;
                    }
                }
            }
        }
    }

    fn flush(&mut self, on_batch: &mut impl FnMut(Batch)) {
        let batch = Batch {
            records: std::mem::take(&mut self.batch),
            skipped: std::mem::take(&mut self.pending_skips),
        };
        if batch.is_empty() {
            return;
        }

        self.produced += batch.records.len();
        tracing::debug!(
            generation = self.generation,
            records = batch.records.len(),
            skipped = batch.skipped,
            produced = self.produced,
            "batch flushed"
        );
        on_batch(batch);
    }

    fn finish(self) -> IngestOutcome {
        let generation = self.generation;
        if let Some(controller) = self.controller.upgrade() {
            controller.send_if_modified(|control| {
                let live = matches!(control.state, IngestState::Running | IngestState::Paused);
                if control.generation == generation && live {
                    control.state = IngestState::Idle;
                    true
                } else {
                    false
                }
            });
        }

        if self.produced == 0 {
            let failure = if self.text.trim().is_empty() {
                IngestFailure::Empty
            } else {
                IngestFailure::NoValidRecords
            };
            tracing::warn!(
                file = %self.meta.file_name,
                skipped = self.stats.skipped,
                "ingestion failed: {}",
                failure
            );
            return IngestOutcome::Failed {
                failure,
                stats: self.stats,
            };
        }

        tracing::info!(
            file = %self.meta.file_name,
            records = self.produced,
            skipped = self.stats.skipped,
            "ingestion completed"
        );

        let mut meta = self.meta;
        meta.record_count = self.produced;
        IngestOutcome::Completed {
            total: self.produced,
            meta,
            stats: self.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convoscope_testing::fixtures;
    use std::sync::Mutex;
    use std::time::Duration;

    fn meta() -> SessionMeta {
        SessionMeta::new("session.jsonl", 0)
    }

    fn recorder() -> (Arc<Mutex<Vec<usize>>>, impl FnMut(Batch)) {
        let sizes = Arc::new(Mutex::new(Vec::new()));
        let sink = sizes.clone();
        (sizes, move |batch: Batch| {
            sink.lock().unwrap().push(batch.records.len())
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_flushes_partial_batch() {
        let controller = IngestController::new(50);
        let mut run = controller.start(fixtures::numbered_session(60), meta());

        for _ in 0..10 {
            assert!(run.advance());
        }
        controller.pause().unwrap();

        let (sizes, sink) = recorder();
        let handle = tokio::spawn(run.run(sink));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(*sizes.lock().unwrap(), [10]);
        assert_eq!(controller.state(), IngestState::Paused);

        controller.resume().unwrap();
        let outcome = handle.await.unwrap();

        assert!(outcome.is_completed());
        assert_eq!(*sizes.lock().unwrap(), [10, 50]);
        assert_eq!(controller.state(), IngestState::Idle);
    }

    #[test]
    fn test_continuation_point_tracks_lines() {
        let controller = IngestController::new(50);
        let mut run = controller.start("{}\n\nnot json", meta());

        assert!(run.advance());
        assert_eq!(run.cursor, 3);
        assert!(run.advance());
        assert!(run.advance());
        assert!(!run.advance());
        assert_eq!(run.stats.total_lines, 3);
        assert_eq!(run.stats.blank, 1);
        assert_eq!(run.pending_skips, 2);
    }

    #[test]
    fn test_invalid_transitions() {
        let controller = IngestController::new(50);

        let err = controller.pause().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                state: IngestState::Idle,
                action: "pause"
            }
        ));
        assert!(controller.resume().is_err());
        assert!(controller.abort().is_err());

        let _run = controller.start("", meta());
        assert!(controller.resume().is_err());
        controller.pause().unwrap();
        assert!(controller.pause().is_err());
        controller.abort().unwrap();
        assert_eq!(controller.state(), IngestState::Aborted);
        assert_eq!(
            controller.resume().unwrap_err().to_string(),
            "cannot resume while aborted"
        );
    }

    #[test]
    fn test_zero_batch_size_is_clamped() {
        assert_eq!(IngestController::new(0).batch_size(), 1);
    }
}
