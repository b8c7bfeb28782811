use convoscope_engine::SessionSummary;
use convoscope_runtime::{IngestStats, SessionMeta};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SummaryView<'a> {
    pub file: &'a SessionMeta,
    pub ingest: &'a IngestStats,
    pub summary: &'a SessionSummary,
}

pub fn render_summary(view: &SummaryView<'_>) -> String {
    let SummaryView {
        file,
        ingest,
        summary,
    } = view;

    let session = file
        .session_id
        .as_deref()
        .or(summary.session_id.as_deref())
        .unwrap_or("-");
    let models = if summary.models.is_empty() {
        "-".to_string()
    } else {
        summary.models.join(", ")
    };

    let rows = [
        ("File:", format!("{} ({} bytes)", file.file_name, file.file_size)),
        ("Session:", session.to_string()),
        (
            "Records:",
            format!("{} ({} skipped)", summary.record_count, ingest.skipped),
        ),
        (
            "Turns:",
            format!(
                "{} ({} assistant, {} user)",
                summary.turn_count, summary.assistant_turns, summary.user_turns
            ),
        ),
        (
            "Tool calls:",
            format!(
                "{} ({} failed, {} pending)",
                summary.tool_calls, summary.failed_tool_calls, summary.pending_tool_calls
            ),
        ),
        ("Sub-agents:", summary.subagents.to_string()),
        ("Models:", models),
        (
            "Tokens:",
            format!(
                "{} in / {} out",
                summary.usage.total_input(),
                summary.usage.output_tokens
            ),
        ),
    ];

    rows.iter()
        .map(|(label, value)| format!("{:<13}{}", label, value))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::test_support::snapshot;
    use convoscope_testing::fixtures;

    #[test]
    fn test_render_summary() {
        let snapshot = snapshot(&fixtures::nested_session());
        let mut meta = SessionMeta::new("nested.jsonl", 2048);
        meta.record_count = 10;
        let ingest = IngestStats {
            total_lines: 11,
            accepted: 10,
            skipped: 1,
            blank: 0,
        };

        let view = SummaryView {
            file: &meta,
            ingest: &ingest,
            summary: &snapshot.summary(),
        };

        insta::assert_snapshot!(render_summary(&view), @r"
        File:        nested.jsonl (2048 bytes)
        Session:     sess-0001
        Records:     10 (1 skipped)
        Turns:       4 (2 assistant, 2 user)
        Tool calls:  4 (1 failed, 0 pending)
        Sub-agents:  2
        Models:      claude-haiku-4, claude-sonnet-4-20250514
        Tokens:      440 in / 74 out
        ");
    }
}
