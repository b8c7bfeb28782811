use anyhow::{Result, anyhow};
use convoscope_runtime::{IngestStats, SessionStore};

use super::print_json;
use crate::presentation::summary::{SummaryView, render_summary};
use crate::types::OutputFormat;

pub fn handle(store: &SessionStore, stats: &IngestStats, format: OutputFormat) -> Result<()> {
    let meta = store
        .meta()
        .ok_or_else(|| anyhow!("session did not finish loading"))?;
    let summary = store.snapshot().summary();
    let view = SummaryView {
        file: meta,
        ingest: stats,
        summary: &summary,
    };

    match format {
        OutputFormat::Json => print_json(&view),
        OutputFormat::Plain => {
            println!("{}", render_summary(&view));
            Ok(())
        }
    }
}
