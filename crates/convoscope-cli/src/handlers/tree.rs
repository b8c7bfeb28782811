use anyhow::Result;
use convoscope_engine::Snapshot;

use super::print_json;
use crate::presentation::Palette;
use crate::presentation::tree::render_tree;
use crate::presentation::views::SubAgentView;
use crate::types::OutputFormat;

pub fn handle(snapshot: &Snapshot, format: OutputFormat) -> Result<()> {
    let roots = snapshot.subagents();

    match format {
        OutputFormat::Json => {
            let views: Vec<SubAgentView> = roots.iter().flat_map(SubAgentView::flatten).collect();
            print_json(&views)
        }
        OutputFormat::Plain => {
            println!("{}", render_tree(&roots, Palette::detect()));
            Ok(())
        }
    }
}
