use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::content::{ContentBlock, ToolResult, ToolUse, UserContent};
use crate::usage::Usage;
use crate::util::{lenient, lenient_vec};

/// Records are shared between the record list, the turns and the indexes.
pub type SharedRecord = Arc<Record>;

/// One decoded line of a session log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum Record {
    Assistant(AssistantRecord),
    User(UserRecord),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Assistant,
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Assistant => write!(f, "assistant"),
            Role::User => write!(f, "user"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantRecord {
    pub uuid: String,
    pub session_id: String,
    /// Task invocation that spawned this record, `None` at the top level
    #[serde(default)]
    pub parent_tool_use_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub message: AssistantMessage,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssistantMessage {
    /// Stable across the physical chunks of one logical message
    #[serde(default, deserialize_with = "lenient")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub model: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub content: Vec<ContentBlock>,
    #[serde(default, deserialize_with = "lenient")]
    pub stop_reason: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub uuid: String,
    pub session_id: String,
    #[serde(default)]
    pub parent_tool_use_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub message: UserMessage,
    /// Free-form tool metadata (file read, todo diff, sub-agent summary, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_use_result: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserMessage {
    #[serde(default, deserialize_with = "deserialize_user_content")]
    pub content: Vec<UserContent>,
}

/// User content is either a bare string (a typed prompt) or a list of blocks.
fn deserialize_user_content<'de, D>(deserializer: D) -> Result<Vec<UserContent>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(text) => vec![UserContent::Text { text }],
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

impl Record {
    pub fn uuid(&self) -> &str {
        match self {
            Record::Assistant(r) => &r.uuid,
            Record::User(r) => &r.uuid,
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            Record::Assistant(r) => &r.session_id,
            Record::User(r) => &r.session_id,
        }
    }

    pub fn parent_tool_use_id(&self) -> Option<&str> {
        match self {
            Record::Assistant(r) => r.parent_tool_use_id.as_deref(),
            Record::User(r) => r.parent_tool_use_id.as_deref(),
        }
    }

    pub fn timestamp(&self) -> Option<&str> {
        match self {
            Record::Assistant(r) => r.timestamp.as_deref(),
            Record::User(r) => r.timestamp.as_deref(),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Record::Assistant(_) => Role::Assistant,
            Record::User(_) => Role::User,
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_tool_use_id().is_none()
    }

    /// Key of the logical message this record belongs to.
    ///
    /// Assistant chunks share their `message.id`; user records stand alone under
    /// their own uuid. An assistant record without a message id also stands alone.
    pub fn group_key(&self) -> &str {
        match self {
            Record::Assistant(r) if !r.message.id.is_empty() => &r.message.id,
            Record::Assistant(r) => &r.uuid,
            Record::User(r) => &r.uuid,
        }
    }

    pub fn as_assistant(&self) -> Option<&AssistantRecord> {
        match self {
            Record::Assistant(r) => Some(r),
            Record::User(_) => None,
        }
    }

    pub fn as_user(&self) -> Option<&UserRecord> {
        match self {
            Record::User(r) => Some(r),
            Record::Assistant(_) => None,
        }
    }

    /// Assistant content blocks; empty for user records.
    pub fn content_blocks(&self) -> &[ContentBlock] {
        match self {
            Record::Assistant(r) => &r.message.content,
            Record::User(_) => &[],
        }
    }

    /// User content blocks; empty for assistant records.
    pub fn user_content(&self) -> &[UserContent] {
        match self {
            Record::User(r) => &r.message.content,
            Record::Assistant(_) => &[],
        }
    }

    pub fn tool_uses(&self) -> impl Iterator<Item = &ToolUse> {
        self.content_blocks().iter().filter_map(ContentBlock::as_tool_use)
    }

    pub fn tool_results(&self) -> impl Iterator<Item = &ToolResult> {
        self.user_content().iter().filter_map(UserContent::as_tool_result)
    }

    pub fn model(&self) -> Option<&str> {
        self.as_assistant()
            .map(|r| r.message.model.as_str())
            .filter(|model| !model.is_empty())
    }

    pub fn usage(&self) -> Option<&Usage> {
        self.as_assistant().and_then(|r| r.message.usage.as_ref())
    }

    pub fn tool_use_result(&self) -> Option<&Value> {
        self.as_user().and_then(|r| r.tool_use_result.as_ref())
    }
}
