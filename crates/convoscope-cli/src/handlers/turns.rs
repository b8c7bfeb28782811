use anyhow::Result;
use convoscope_engine::{FilterFacets, Snapshot};
use convoscope_types::Turn;

use super::print_json;
use crate::presentation::Palette;
use crate::presentation::turns::render_turns;
use crate::presentation::views::TurnView;
use crate::types::OutputFormat;

pub fn handle(snapshot: &Snapshot, facets: &FilterFacets, format: OutputFormat) -> Result<()> {
    let turns: Vec<&Turn> = snapshot.visible_turns(facets, "");
    tracing::debug!(
        shown = turns.len(),
        total = snapshot.turns.len(),
        active = facets.is_active(),
        "turn facets applied"
    );

    match format {
        OutputFormat::Json => {
            let views: Vec<TurnView> = turns.iter().map(|turn| TurnView::new(turn)).collect();
            print_json(&views)
        }
        OutputFormat::Plain => {
            println!("{}", render_turns(&turns, Palette::detect()));
            Ok(())
        }
    }
}
