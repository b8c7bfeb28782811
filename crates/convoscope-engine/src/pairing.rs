use convoscope_types::{SharedRecord, ToolResult, ToolUse, UserRecord, content_text};
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;

/// A tool invocation and, once it has arrived, its result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCallPair {
    pub tool_use: ToolUse,
    /// `None` while the tool is still executing (or the log was cut short)
    pub result: Option<PairedResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedResult {
    pub content: Value,
    pub is_error: bool,
    /// The user record's `tool_use_result` blob
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// uuid of the user record carrying the result
    pub record_uuid: String,
}

impl PairedResult {
    pub(crate) fn new(block: &ToolResult, record: &UserRecord) -> Self {
        Self {
            content: block.content.clone(),
            is_error: block.is_error(),
            metadata: record.tool_use_result.clone(),
            record_uuid: record.uuid.clone(),
        }
    }

    pub fn text(&self) -> Cow<'_, str> {
        content_text(&self.content)
    }
}

impl ToolCallPair {
    pub(crate) fn pending(tool_use: &ToolUse) -> Self {
        Self {
            tool_use: tool_use.clone(),
            result: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.tool_use.id
    }

    pub fn is_pending(&self) -> bool {
        self.result.is_none()
    }

    pub fn is_error(&self) -> bool {
        self.result.as_ref().is_some_and(|r| r.is_error)
    }
}

/// Match tool invocations to their results within a flat record list.
///
/// Pairs come out in first-seen order of the invocation. Results whose
/// invocation appears nowhere in the list are dropped; a result that arrives
/// before its invocation still pairs. If several results name the same
/// invocation, the last one wins.
pub fn pair_tool_calls(records: &[SharedRecord]) -> Vec<ToolCallPair> {
    let mut pairs: Vec<ToolCallPair> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for tool_use in records.iter().flat_map(|record| record.tool_uses()) {
        if positions.contains_key(tool_use.id.as_str()) {
            continue;
        }
        positions.insert(&tool_use.id, pairs.len());
        pairs.push(ToolCallPair::pending(tool_use));
    }

    for record in records {
        let Some(user) = record.as_user() else {
            continue;
        };
        for block in record.tool_results() {
            if let Some(&idx) = positions.get(block.tool_use_id.as_str()) {
                pairs[idx].result = Some(PairedResult::new(block, user));
            }
        }
    }

    pairs
}
