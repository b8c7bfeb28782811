//! Builders for single log lines.
//!
//! Lines are produced as JSON text exactly as they appear in a session log, so
//! tests exercise the real parser rather than hand-built structs.

use serde_json::{Value, json};

pub const SESSION_ID: &str = "sess-0001";
pub const MODEL: &str = "claude-sonnet-4-20250514";

#[derive(Debug, Clone)]
pub struct LineBuilder {
    value: Value,
}

impl LineBuilder {
    pub fn assistant(uuid: &str, message_id: &str) -> Self {
        Self {
            value: json!({
                "type": "assistant",
                "uuid": uuid,
                "session_id": SESSION_ID,
                "parent_tool_use_id": null,
                "message": {
                    "id": message_id,
                    "type": "message",
                    "role": "assistant",
                    "model": MODEL,
                    "content": [],
                    "stop_reason": null,
                    "usage": null
                }
            }),
        }
    }

    pub fn user(uuid: &str) -> Self {
        Self {
            value: json!({
                "type": "user",
                "uuid": uuid,
                "session_id": SESSION_ID,
                "parent_tool_use_id": null,
                "message": {"role": "user", "content": []}
            }),
        }
    }

    pub fn text(self, text: &str) -> Self {
        self.push_content(json!({"type": "text", "text": text}))
    }

    pub fn tool_use(self, id: &str, name: &str, input: Value) -> Self {
        self.push_content(json!({"type": "tool_use", "id": id, "name": name, "input": input}))
    }

    pub fn tool_result(self, tool_use_id: &str, content: &str, is_error: bool) -> Self {
        self.push_content(json!({
            "type": "tool_result",
            "tool_use_id": tool_use_id,
            "content": content,
            "is_error": is_error
        }))
    }

    pub fn parent(mut self, parent_tool_use_id: &str) -> Self {
        self.value["parent_tool_use_id"] = json!(parent_tool_use_id);
        self
    }

    pub fn session(mut self, session_id: &str) -> Self {
        self.value["session_id"] = json!(session_id);
        self
    }

    pub fn model(mut self, model: &str) -> Self {
        self.value["message"]["model"] = json!(model);
        self
    }

    pub fn usage(mut self, input_tokens: u64, output_tokens: u64) -> Self {
        self.value["message"]["usage"] = json!({
            "input_tokens": input_tokens,
            "output_tokens": output_tokens,
            "cache_creation_input_tokens": 0,
            "cache_read_input_tokens": 0,
            "service_tier": "standard"
        });
        self
    }

    /// Out-of-band `tool_use_result` blob on a user line.
    pub fn metadata(mut self, metadata: Value) -> Self {
        self.value["tool_use_result"] = metadata;
        self
    }

    pub fn build(self) -> String {
        self.value.to_string()
    }

    fn push_content(mut self, block: Value) -> Self {
        if let Some(content) = self.value["message"]["content"].as_array_mut() {
            content.push(block);
        }
        self
    }
}

pub fn assistant_text(uuid: &str, message_id: &str, text: &str) -> String {
    LineBuilder::assistant(uuid, message_id).text(text).build()
}

pub fn assistant_tool_use(uuid: &str, message_id: &str, id: &str, name: &str, input: Value) -> String {
    LineBuilder::assistant(uuid, message_id)
        .tool_use(id, name, input)
        .build()
}

/// A `Task` invocation spawning a sub-agent.
pub fn task_call(uuid: &str, message_id: &str, task_id: &str, description: &str) -> String {
    LineBuilder::assistant(uuid, message_id)
        .tool_use(
            task_id,
            "Task",
            json!({
                "description": description,
                "prompt": format!("Please {}", description),
                "subagent_type": "general-purpose"
            }),
        )
        .build()
}

pub fn user_tool_result(uuid: &str, tool_use_id: &str, content: &str, is_error: bool) -> String {
    LineBuilder::user(uuid)
        .tool_result(tool_use_id, content, is_error)
        .build()
}

/// Join lines into a log text with a trailing newline.
pub fn log(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}
