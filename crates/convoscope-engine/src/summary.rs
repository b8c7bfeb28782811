use convoscope_types::{Role, Turn, Usage};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::index::MultiIndex;
use crate::subagent::build_roots;

/// Session-wide counts, covering nested sub-agent activity as well as the top level.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSummary {
    /// Session id of the first turn, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub record_count: usize,
    /// Top-level turns
    pub turn_count: usize,
    pub assistant_turns: usize,
    pub user_turns: usize,
    pub tool_calls: usize,
    pub pending_tool_calls: usize,
    pub failed_tool_calls: usize,
    /// Sub-agents at any depth
    pub subagents: usize,
    pub models: Vec<String>,
    /// Each logical message counted once, at its highest reported values
    pub usage: Usage,
}

pub fn summarize(turns: &[Turn], index: &MultiIndex) -> SessionSummary {
    let mut summary = SessionSummary {
        session_id: turns.first().map(|turn| turn.session_id.clone()),
        record_count: index.record_count(),
        turn_count: turns.len(),
        assistant_turns: turns.iter().filter(|t| t.role == Role::Assistant).count(),
        user_turns: turns.iter().filter(|t| t.role == Role::User).count(),
        ..Default::default()
    };

    for call in index.tool_calls() {
        summary.tool_calls += 1;
        if call.is_pending() {
            summary.pending_tool_calls += 1;
        } else if call.is_error() {
            summary.failed_tool_calls += 1;
        }
    }

    let roots = build_roots(index, turns.iter().flat_map(Turn::tool_uses));
    summary.subagents = roots.iter().map(|root| root.node_count()).sum();

    let mut models = BTreeSet::new();
    let mut groups: Vec<_> = index.message_groups().collect();
    groups.sort_by_key(|(role, key, _)| (*key, *role));

    for (_, _, records) in groups {
        models.extend(records.iter().filter_map(|record| record.model()));

        let mut group_usage: Option<Usage> = None;
        for usage in records.iter().filter_map(|record| record.usage()) {
            match group_usage.as_mut() {
                Some(current) => current.merge_max(usage),
                None => group_usage = Some(usage.clone()),
            }
        }
        if let Some(usage) = group_usage {
            summary.usage += &usage;
        }
    }
    summary.models = models.into_iter().map(String::from).collect();

    summary
}
