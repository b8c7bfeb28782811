//! Serializable views for `--format json`.

use convoscope_engine::{SubAgentNode, SubAgentStats, ToolCallPair};
use convoscope_types::{Role, Turn, file_path_of};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Ok,
    Error,
    Pending,
}

impl CallStatus {
    pub fn of(call: &ToolCallPair) -> Self {
        if call.is_pending() {
            CallStatus::Pending
        } else if call.is_error() {
            CallStatus::Error
        } else {
            CallStatus::Ok
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CallStatus::Ok => "ok",
            CallStatus::Error => "error",
            CallStatus::Pending => "pending",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TurnView<'a> {
    pub key: &'a str,
    pub role: Role,
    pub text: String,
    pub tools: Vec<&'a str>,
    pub models: Vec<&'a str>,
    pub records: usize,
    pub has_error: bool,
    pub has_subagent: bool,
}

impl<'a> TurnView<'a> {
    pub fn new(turn: &'a Turn) -> Self {
        Self {
            key: &turn.key,
            role: turn.role,
            text: turn.text(),
            tools: turn.tool_uses().map(|tool_use| tool_use.name.as_str()).collect(),
            models: turn.models().into_iter().collect(),
            records: turn.records.len(),
            has_error: turn.has_error(),
            has_subagent: turn.has_task_call(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ToolCallView<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub status: CallStatus,
    pub input: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<&'a str>,
}

impl<'a> ToolCallView<'a> {
    pub fn new(call: &'a ToolCallPair) -> Self {
        Self {
            id: call.id(),
            name: &call.tool_use.name,
            status: CallStatus::of(call),
            input: &call.tool_use.input,
            result: call.result.as_ref().map(|result| result.text().into_owned()),
            file_path: call
                .result
                .as_ref()
                .and_then(|result| result.metadata.as_ref())
                .and_then(file_path_of),
        }
    }
}

/// One row of a flattened sub-agent tree, in depth-first order.
#[derive(Debug, Serialize)]
pub struct SubAgentView<'a> {
    pub parent_id: &'a str,
    /// Invocation whose sub-agent issued this one; `None` for a root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spawned_by: Option<&'a str>,
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subagent_type: Option<&'a str>,
    pub stats: SubAgentStats,
}

impl<'a> SubAgentView<'a> {
    pub fn flatten(root: &'a SubAgentNode) -> Vec<Self> {
        let mut ancestors: Vec<&'a str> = Vec::new();
        let mut rows = Vec::new();

        for ((depth, node), stats) in root.walk().into_iter().zip(root.subtree_stats()) {
            ancestors.truncate(depth);
            rows.push(Self {
                parent_id: &node.parent_id,
                spawned_by: ancestors.last().copied(),
                depth,
                description: node.description(),
                subagent_type: node.task.as_ref().and_then(|task| task.subagent_type()),
                stats,
            });
            ancestors.push(&node.parent_id);
        }
        rows
    }
}
