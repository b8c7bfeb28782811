use convoscope_engine::{SubAgentNode, SubAgentStats};

use super::Palette;

pub fn render_tree(roots: &[SubAgentNode], palette: Palette) -> String {
    if roots.is_empty() {
        return "No sub-agents".to_string();
    }
    let mut lines = Vec::new();
    for root in roots {
        let stats = root.subtree_stats();
        for ((depth, node), stats) in root.walk().into_iter().zip(&stats) {
            lines.push(node_line(node, depth, stats, palette));
        }
    }
    lines.join("\n")
}

fn node_line(node: &SubAgentNode, depth: usize, stats: &SubAgentStats, palette: Palette) -> String {
    let mut line = format!("{}{}", "  ".repeat(depth), palette.key(&node.parent_id));

    if let Some(description) = node.description() {
        line.push_str("  ");
        line.push_str(description);
    }
    if let Some(kind) = node.task.as_ref().and_then(|task| task.subagent_type()) {
        line.push_str(&format!(" ({})", kind));
    }

    let counts = format!(
        "records={} turns={} tool_calls={} failed={} pending={}",
        stats.records,
        stats.turns,
        stats.tool_calls,
        stats.failed_tool_calls,
        stats.pending_tool_calls
    );
    line.push_str("  ");
    line.push_str(&palette.dim(&counts));
    line
}
