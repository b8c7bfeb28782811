use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

use crate::config::SearchConfig;

/// Holds back query edits until input has been quiet for `delay`.
#[derive(Debug)]
pub struct QueryDebouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl QueryDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.debounce())
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a new query value, restarting the quiet period.
    pub fn push(&mut self, query: impl Into<String>) {
        self.pending = Some((query.into(), Instant::now() + self.delay));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Take the pending query if its quiet period has elapsed by `now`.
    pub fn poll_ready(&mut self, now: Instant) -> Option<String> {
        match self.deadline() {
            Some(deadline) if deadline <= now => self.take(),
            _ => None,
        }
    }

    /// Wait out the quiet period of the pending query and return it.
    pub async fn settled(&mut self) -> Option<String> {
        let deadline = self.deadline()?;
        sleep_until(deadline).await;
        self.take()
    }

    /// Next settled query from a stream of edits.
    ///
    /// Returns `None` once `input` is closed and nothing is pending; a pending
    /// query is released immediately when the input closes.
    pub async fn next_settled(&mut self, input: &mut mpsc::UnboundedReceiver<String>) -> Option<String> {
        loop {
            match self.deadline() {
                Some(deadline) => tokio::select! {
                    query = input.recv() => match query {
                        Some(query) => self.push(query),
                        None => return self.take(),
                    },
                    _ = sleep_until(deadline) => return self.take(),
                },
                None => match input.recv().await {
                    Some(query) => self.push(query),
                    None => return None,
                },
            }
        }
    }

    fn take(&mut self) -> Option<String> {
        self.pending.take().map(|(query, _)| query)
    }
}

impl Default for QueryDebouncer {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}
