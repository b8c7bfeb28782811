use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::borrow::Cow;

/// Tool name whose invocations spawn a nested sub-agent conversation.
pub const TASK_TOOL_NAME: &str = "Task";

pub fn is_task_tool(name: &str) -> bool {
    name == TASK_TOOL_NAME
}

/// Deserialize a field, falling back to `T::default()` when the value has the wrong shape.
///
/// Log lines are untrusted: a single odd field must not cost us the whole record.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Deserialize a list element by element; elements that fail to decode become `T::default()`.
/// A non-array value yields an empty list.
pub fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

/// Flatten a tool result `content` value into searchable/displayable text.
///
/// - string: returned as-is
/// - array of `{type: "text", text}` parts: texts joined with newlines
/// - null: empty
/// - anything else: compact JSON
pub fn content_text(content: &Value) -> Cow<'_, str> {
    match content {
        Value::Null => Cow::Borrowed(""),
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Array(parts) => {
            let texts: Vec<&str> = parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect();
            if texts.is_empty() && !parts.is_empty() {
                Cow::Owned(content.to_string())
            } else {
                Cow::Owned(texts.join("\n"))
            }
        }
        other => Cow::Owned(other.to_string()),
    }
}

/// File path carried by a `tool_use_result` metadata blob, if any.
///
/// Read results nest it under `file.filePath`; edits and writes put it at the top level.
pub fn file_path_of(metadata: &Value) -> Option<&str> {
    metadata
        .get("file")
        .and_then(|file| file.get("filePath"))
        .or_else(|| metadata.get("filePath"))
        .and_then(Value::as_str)
}
