use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::content::{ContentBlock, ToolResult, ToolUse, UserContent};
use crate::record::{Role, SharedRecord};
use crate::usage::Usage;

/// A logical, display-ready message: one or more records sharing a group key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// `message.id` for assistant turns, record uuid for user turns
    pub key: String,
    pub role: Role,
    /// Contributing records in arrival order
    pub records: Vec<SharedRecord>,
    /// Assistant content blocks of all records, concatenated in arrival order
    pub blocks: Vec<ContentBlock>,
    pub parent_tool_use_id: Option<String>,
    pub session_id: String,
}

impl Turn {
    pub fn is_top_level(&self) -> bool {
        self.parent_tool_use_id.is_none()
    }

    pub fn tool_uses(&self) -> impl Iterator<Item = &ToolUse> {
        self.blocks.iter().filter_map(ContentBlock::as_tool_use)
    }

    pub fn tool_results(&self) -> impl Iterator<Item = &ToolResult> {
        self.records.iter().flat_map(|record| record.tool_results())
    }

    /// Task invocations issued by this turn.
    pub fn task_calls(&self) -> impl Iterator<Item = &ToolUse> {
        self.tool_uses().filter(|tool_use| tool_use.is_task())
    }

    pub fn has_error(&self) -> bool {
        self.tool_results().any(ToolResult::is_error)
    }

    pub fn has_task_call(&self) -> bool {
        self.task_calls().next().is_some()
    }

    pub fn has_text(&self) -> bool {
        self.blocks
            .iter()
            .any(|block| matches!(block, ContentBlock::Text { .. }))
    }

    /// Plain text of the turn: assistant text blocks, or user prompt text.
    pub fn text(&self) -> String {
        let assistant = self.blocks.iter().filter_map(ContentBlock::as_text);
        let user = self
            .records
            .iter()
            .flat_map(|record| record.user_content())
            .filter_map(|content| match content {
                UserContent::Text { text } => Some(text.as_str()),
                _ => None,
            });
        assistant.chain(user).collect::<Vec<_>>().concat()
    }

    /// Distinct model identifiers of the underlying assistant records.
    pub fn models(&self) -> BTreeSet<&str> {
        self.records.iter().filter_map(|record| record.model()).collect()
    }

    /// Usage of the logical message (max-merged across its chunks).
    pub fn usage(&self) -> Option<Usage> {
        let mut merged: Option<Usage> = None;
        for usage in self.records.iter().filter_map(|record| record.usage()) {
            match merged.as_mut() {
                Some(current) => current.merge_max(usage),
                None => merged = Some(usage.clone()),
            }
        }
        merged
    }
}
