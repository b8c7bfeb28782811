// Runtime - drives ingestion and holds session state for front ends.

pub mod config;
pub mod debounce;
pub mod error;
pub mod ingest;
pub mod store;

pub use config::{Config, IngestConfig, LogConfig, SearchConfig, resolve_config_path};
pub use debounce::QueryDebouncer;
pub use error::{Error, Result};
pub use ingest::{
    Batch, IngestController, IngestFailure, IngestOutcome, IngestRun, IngestState, IngestStats,
    SessionMeta,
};
pub use store::SessionStore;

use std::path::Path;

/// Read a log file and ingest it into a fresh store.
pub async fn load_session(path: &Path, config: &Config) -> Result<(SessionStore, IngestOutcome)> {
    let text = std::fs::read_to_string(path)?;
    let meta = SessionMeta::for_file(path)?;

    let controller = IngestController::from_config(&config.ingest);
    let mut store = SessionStore::new();
    let outcome = store.ingest(controller.start(text, meta)).await;
    Ok((store, outcome))
}
