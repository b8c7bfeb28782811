use convoscope_types::{AssistantRecord, Record, UserRecord};
use serde_json::{Map, Value};
use std::fmt;

/// Result of decoding one physical line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Record(Record),
    /// Whitespace only; not counted as a skip
    Blank,
    Rejected(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Not valid JSON
    Malformed,
    /// Valid JSON but not an object
    NotAnObject,
    /// `type` missing or not one of "assistant" / "user"
    UnsupportedType,
    /// Required string field missing or not a string
    MissingField(&'static str),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Malformed => write!(f, "malformed JSON"),
            RejectReason::NotAnObject => write!(f, "not a JSON object"),
            RejectReason::UnsupportedType => write!(f, "unsupported record type"),
            RejectReason::MissingField(field) => write!(f, "missing string field `{}`", field),
        }
    }
}

impl LineOutcome {
    pub fn into_record(self) -> Option<Record> {
        match self {
            LineOutcome::Record(record) => Some(record),
            _ => None,
        }
    }
}

enum Kind {
    Assistant,
    User,
}

/// Decode one line of a session log.
///
/// Only the envelope is checked: `type` must be "assistant" or "user", and
/// `uuid` and `session_id` must be strings. The message body is decoded
/// leniently, so a well-shaped record is never rejected for odd content.
pub fn parse_line(line: &str) -> LineOutcome {
    let line = line.trim();
    if line.is_empty() {
        return LineOutcome::Blank;
    }

    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(_) => return LineOutcome::Rejected(RejectReason::Malformed),
    };

    let Value::Object(mut fields) = value else {
        return LineOutcome::Rejected(RejectReason::NotAnObject);
    };

    let kind = match fields.get("type").and_then(Value::as_str) {
        Some("assistant") => Kind::Assistant,
        Some("user") => Kind::User,
        _ => return LineOutcome::Rejected(RejectReason::UnsupportedType),
    };

    let Some(uuid) = take_string(&mut fields, &["uuid"]) else {
        return LineOutcome::Rejected(RejectReason::MissingField("uuid"));
    };
    let Some(session_id) = take_string(&mut fields, &["session_id", "sessionId"]) else {
        return LineOutcome::Rejected(RejectReason::MissingField("session_id"));
    };

    // Empty parent ids show up in some exports; they mean "top level"
    let parent_tool_use_id = take_string(&mut fields, &["parent_tool_use_id", "parentToolUseId"])
        .filter(|id| !id.is_empty());
    let timestamp = take_string(&mut fields, &["timestamp"]);
    let message = fields.remove("message").unwrap_or(Value::Null);

    let record = match kind {
        Kind::Assistant => Record::Assistant(AssistantRecord {
            uuid,
            session_id,
            parent_tool_use_id,
            timestamp,
            message: decode_lenient(message),
        }),
        Kind::User => {
            let tool_use_result = take_value(&mut fields, &["tool_use_result", "toolUseResult"])
                .filter(|value| !value.is_null());
            Record::User(UserRecord {
                uuid,
                session_id,
                parent_tool_use_id,
                timestamp,
                message: decode_lenient(message),
                tool_use_result,
            })
        }
    };

    LineOutcome::Record(record)
}

fn decode_lenient<T>(value: Value) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    serde_json::from_value(value).unwrap_or_default()
}

/// First of `keys` present as a string. A present but non-string value counts as absent.
fn take_string(fields: &mut Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match fields.remove(*key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn take_value(fields: &mut Map<String, Value>, keys: &[&str]) -> Option<Value> {
    keys.iter().find_map(|key| fields.remove(*key))
}
