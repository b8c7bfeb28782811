use anyhow::Result;
use convoscope_engine::{FilterFacets, Snapshot};

use super::print_json;
use crate::presentation::Palette;
use crate::presentation::turns::{apply_facets, render_search};
use crate::types::OutputFormat;

pub fn handle(
    snapshot: &Snapshot,
    query: &str,
    facets: &FilterFacets,
    format: OutputFormat,
) -> Result<()> {
    let result = apply_facets(snapshot.search(query), snapshot, facets);

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "query": result.query,
            "active": result.is_active(),
            "total_matches": result.total_matches(),
            "matched_keys": result.matched_keys,
        })),
        OutputFormat::Plain => {
            println!("{}", render_search(&result, snapshot, Palette::detect()));
            Ok(())
        }
    }
}
