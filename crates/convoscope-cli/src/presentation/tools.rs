use convoscope_engine::ToolCallPair;

use super::views::{CallStatus, ToolCallView};
use super::{PREVIEW_CHARS, Palette, truncate_for_display};

pub fn call_line(call: &ToolCallPair, palette: Palette) -> String {
    let view = ToolCallView::new(call);
    let status = match view.status {
        CallStatus::Ok => palette.ok(view.status.label()),
        CallStatus::Error => palette.error(view.status.label()),
        CallStatus::Pending => palette.pending(view.status.label()),
    };

    let mut line = format!("{}  {}  {}", palette.key(view.id), view.name, status);
    if let Some(result) = &view.result {
        let result = truncate_for_display(result, PREVIEW_CHARS);
        if !result.is_empty() {
            line.push_str("  ");
            line.push_str(&result);
        }
    }
    if let Some(path) = view.file_path {
        line.push_str("  ");
        line.push_str(&palette.dim(path));
    }
    line
}

pub fn render_calls(calls: &[&ToolCallPair], palette: Palette) -> String {
    if calls.is_empty() {
        return "No tool calls".to_string();
    }
    calls
        .iter()
        .map(|call| call_line(call, palette))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::test_support::snapshot;
    use convoscope_testing::{fixtures, lines};
    use serde_json::json;

    #[test]
    fn test_render_top_level_calls() {
        let snapshot = snapshot(&fixtures::nested_session());
        let calls: Vec<&ToolCallPair> = snapshot
            .turns
            .iter()
            .flat_map(|turn| snapshot.tool_calls_of(turn))
            .collect();

        insta::assert_snapshot!(render_calls(&calls, Palette::new(false)), @r"
        task1  Task  ok  Survey complete
        b1  Bash  error  Diff in src/lib.rs
        ");
    }

    #[test]
    fn test_render_nested_calls_with_file_path() {
        let snapshot = snapshot(&fixtures::nested_session());

        insta::assert_snapshot!(render_calls(&snapshot.tool_calls_under("task1"), Palette::new(false)), @r"
        r1  Read  ok  pub mod engine;  /repo/src/lib.rs
        task2  Task  ok  nested agent finished
        ");
    }

    #[test]
    fn test_pending_call() {
        let snapshot = snapshot(&lines::log(&[lines::assistant_tool_use(
            "a1",
            "m1",
            "t1",
            "Bash",
            json!({"command": "sleep 5"}),
        )]));
        let calls: Vec<&ToolCallPair> = snapshot.index.tool_calls().collect();
        assert_eq!(render_calls(&calls, Palette::new(false)), "t1  Bash  pending");
    }
}
