use convoscope_types::{Role, SharedRecord};
use std::collections::HashMap;

use crate::pairing::{PairedResult, ToolCallPair};

/// Lookup structures over every record of a session, top level and nested.
///
/// Rebuilt from scratch for each batch; two builds over the same record list
/// compare equal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiIndex {
    by_uuid: HashMap<String, SharedRecord>,
    /// Keyed like turns: an assistant message id and a user uuid never share a group
    by_message: HashMap<(Role, String), Vec<SharedRecord>>,
    by_tool_call: HashMap<String, ToolCallPair>,
    by_parent: HashMap<String, Vec<SharedRecord>>,
}

impl MultiIndex {
    pub fn build(records: &[SharedRecord]) -> Self {
        let mut index = MultiIndex::default();
        // Results that showed up before their invocation
        let mut early_results: HashMap<String, PairedResult> = HashMap::new();

        for record in records {
            index
                .by_uuid
                .insert(record.uuid().to_string(), record.clone());

            if let Some(parent) = record.parent_tool_use_id() {
                index
                    .by_parent
                    .entry(parent.to_string())
                    .or_default()
                    .push(record.clone());
            }

            index
                .by_message
                .entry((record.role(), record.group_key().to_string()))
                .or_default()
                .push(record.clone());

            for tool_use in record.tool_uses() {
                if index.by_tool_call.contains_key(&tool_use.id) {
                    continue;
                }
                let mut pair = ToolCallPair::pending(tool_use);
                pair.result = early_results.remove(&tool_use.id);
                index.by_tool_call.insert(tool_use.id.clone(), pair);
            }

            if let Some(user) = record.as_user() {
                for block in record.tool_results() {
                    let result = PairedResult::new(block, user);
                    match index.by_tool_call.get_mut(&block.tool_use_id) {
                        Some(pair) => pair.result = Some(result),
                        None => {
                            early_results.insert(block.tool_use_id.clone(), result);
                        }
                    }
                }
            }
        }

        if !early_results.is_empty() {
            tracing::trace!(
                unmatched = early_results.len(),
                "tool results without a matching invocation"
            );
        }

        index
    }

    pub fn record(&self, uuid: &str) -> Option<&SharedRecord> {
        self.by_uuid.get(uuid)
    }

    /// Records of one logical message (message id for assistant, uuid for user).
    pub fn message_group(&self, role: Role, key: &str) -> &[SharedRecord] {
        self.by_message
            .get(&(role, key.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn tool_call(&self, tool_use_id: &str) -> Option<&ToolCallPair> {
        self.by_tool_call.get(tool_use_id)
    }

    /// Records spawned by the given tool invocation, in arrival order.
    pub fn children(&self, parent_tool_use_id: &str) -> &[SharedRecord] {
        self.by_parent
            .get(parent_tool_use_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_children(&self, parent_tool_use_id: &str) -> bool {
        self.by_parent.contains_key(parent_tool_use_id)
    }

    pub fn record_count(&self) -> usize {
        self.by_uuid.len()
    }

    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCallPair> {
        self.by_tool_call.values()
    }

    pub fn message_groups(&self) -> impl Iterator<Item = (Role, &str, &[SharedRecord])> {
        self.by_message
            .iter()
            .map(|((role, key), records)| (*role, key.as_str(), records.as_slice()))
    }

    pub fn parent_ids(&self) -> impl Iterator<Item = &str> {
        self.by_parent.keys().map(String::as_str)
    }
}
