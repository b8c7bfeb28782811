use anyhow::{Result, bail};
use convoscope_engine::{Snapshot, ToolCallPair};

use super::print_json;
use crate::presentation::Palette;
use crate::presentation::tools::render_calls;
use crate::presentation::views::ToolCallView;
use crate::types::OutputFormat;

pub fn handle(snapshot: &Snapshot, parent: Option<&str>, format: OutputFormat) -> Result<()> {
    let calls: Vec<&ToolCallPair> = match parent {
        Some(parent) => {
            if !snapshot.index.has_children(parent) {
                bail!("no sub-agent records under invocation '{}'", parent);
            }
            snapshot.tool_calls_under(parent)
        }
        None => snapshot
            .turns
            .iter()
            .flat_map(|turn| snapshot.tool_calls_of(turn))
            .collect(),
    };

    match format {
        OutputFormat::Json => {
            let views: Vec<ToolCallView> = calls.iter().map(|call| ToolCallView::new(call)).collect();
            print_json(&views)
        }
        OutputFormat::Plain => {
            println!("{}", render_calls(&calls, Palette::detect()));
            Ok(())
        }
    }
}
