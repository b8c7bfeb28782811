//! Ready-made session logs.

use crate::lines::{self, LineBuilder};
use anyhow::Result;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

/// A session with a two-level sub-agent tree:
///
/// ```text
/// m1  (top)  text "Let me look around" + Task task1
///   task1 -> sub-agent: Read r1 (result with file path), Task task2
///     task2 -> nested sub-agent: text "found the needle"
/// u-task1   (top) result of task1
/// m2  (top)  text "All done" + Bash b1
/// u-b1      (top) error result of b1
/// ```
pub fn nested_session() -> String {
    lines::log(&[
        LineBuilder::assistant("a-1", "m1")
            .text("Let me look around")
            .usage(100, 10)
            .build(),
        LineBuilder::assistant("a-2", "m1")
            .tool_use(
                "task1",
                "Task",
                json!({"description": "Survey repo", "prompt": "Survey the repo", "subagent_type": "Explore"}),
            )
            .usage(100, 40)
            .build(),
        LineBuilder::assistant("sub-a-1", "sm1")
            .parent("task1")
            .tool_use("r1", "Read", json!({"file_path": "/repo/src/lib.rs"}))
            .model("claude-haiku-4")
            .usage(50, 5)
            .build(),
        LineBuilder::user("sub-u-1")
            .parent("task1")
            .tool_result("r1", "pub mod engine;", false)
            .metadata(json!({"type": "text", "file": {"filePath": "/repo/src/lib.rs", "numLines": 1}}))
            .build(),
        LineBuilder::assistant("sub-a-2", "sm2")
            .parent("task1")
            .tool_use(
                "task2",
                "Task",
                json!({"description": "Dig deeper", "prompt": "Dig", "subagent_type": "general-purpose"}),
            )
            .model("claude-haiku-4")
            .usage(60, 6)
            .build(),
        LineBuilder::assistant("sub2-a-1", "ssm1")
            .parent("task2")
            .text("found the needle")
            .model("claude-haiku-4")
            .usage(30, 3)
            .build(),
        LineBuilder::user("sub-u-2")
            .parent("task1")
            .tool_result("task2", "nested agent finished", false)
            .build(),
        LineBuilder::user("u-task1")
            .tool_result("task1", "Survey complete", false)
            .metadata(json!({"status": "completed", "totalDurationMs": 1200}))
            .build(),
        LineBuilder::assistant("a-3", "m2")
            .text("All done")
            .tool_use("b1", "Bash", json!({"command": "cargo fmt --check"}))
            .usage(200, 20)
            .build(),
        LineBuilder::user("u-b1")
            .tool_result("b1", "Diff in src/lib.rs", true)
            .build(),
    ])
}

/// `count` valid single-chunk assistant lines.
pub fn numbered_session(count: usize) -> String {
    let lines: Vec<String> = (0..count)
        .map(|i| lines::assistant_text(&format!("a-{}", i), &format!("m-{}", i), &format!("line {}", i)))
        .collect();
    lines::log(&lines)
}

/// Write a log into `dir` and return its path.
pub fn write_log(dir: &Path, name: &str, text: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, text)?;
    Ok(path)
}

/// Write a log to a fresh temp file (removed on drop).
pub fn temp_log(text: &str) -> Result<tempfile::NamedTempFile> {
    use std::io::Write;

    let mut file = tempfile::Builder::new().suffix(".jsonl").tempfile()?;
    file.write_all(text.as_bytes())?;
    file.flush()?;
    Ok(file)
}
