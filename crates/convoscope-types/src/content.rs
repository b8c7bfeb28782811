use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;

use crate::util::{content_text, is_task_tool};

/// Content block of an assistant message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        #[serde(default)]
        text: String,
    },
    Thinking {
        #[serde(default)]
        thinking: String,
    },
    ToolUse(ToolUse),
    /// Block kinds we do not interpret (images, redacted thinking, server tools, ...)
    #[default]
    #[serde(other)]
    Unknown,
}

impl ContentBlock {
    pub fn as_tool_use(&self) -> Option<&ToolUse> {
        match self {
            ContentBlock::ToolUse(tool_use) => Some(tool_use),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// A request from the assistant to run a named tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub input: Value,
}

impl ToolUse {
    /// True when this invocation spawns a sub-agent.
    pub fn is_task(&self) -> bool {
        is_task_tool(&self.name)
    }

    /// Input parameters as compact JSON, the form matched by search.
    pub fn input_text(&self) -> String {
        match &self.input {
            Value::Null => String::new(),
            input => input.to_string(),
        }
    }

    /// `description` argument of a Task invocation.
    pub fn description(&self) -> Option<&str> {
        self.input.get("description").and_then(Value::as_str)
    }

    /// `subagent_type` argument of a Task invocation.
    pub fn subagent_type(&self) -> Option<&str> {
        self.input.get("subagent_type").and_then(Value::as_str)
    }
}

/// Content block of a user (tool-result) message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum UserContent {
    Text {
        #[serde(default)]
        text: String,
    },
    ToolResult(ToolResult),
    #[default]
    #[serde(other)]
    Unknown,
}

impl UserContent {
    pub fn as_tool_result(&self) -> Option<&ToolResult> {
        match self {
            UserContent::ToolResult(result) => Some(result),
            _ => None,
        }
    }
}

/// Outcome of a tool invocation, linked back to it by `tool_use_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_use_id: String,
    #[serde(default)]
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl ToolResult {
    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    pub fn text(&self) -> Cow<'_, str> {
        content_text(&self.content)
    }
}
