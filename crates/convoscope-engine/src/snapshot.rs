use convoscope_types::{Record, Role, SharedRecord, Turn};

use crate::filter::{FilterFacets, available_models, available_tools, filter_turns};
use crate::grouping::group_turns;
use crate::index::MultiIndex;
use crate::pairing::ToolCallPair;
use crate::search::{SearchResult, search_turns};
use crate::subagent::{SubAgentNode, build_roots, build_subagent_tree};
use crate::summary::{SessionSummary, summarize};

/// Everything derived from one record list: top-level turns plus the index over
/// all records.
///
/// Derived state is never patched in place. Each new batch produces a fresh
/// snapshot from the full record list, so a snapshot only depends on the
/// records it was built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub turns: Vec<Turn>,
    pub index: MultiIndex,
}

impl Snapshot {
    pub fn build(records: &[SharedRecord]) -> Self {
        let top_level: Vec<SharedRecord> = records
            .iter()
            .filter(|record| record.is_top_level())
            .cloned()
            .collect();

        let snapshot = Self {
            turns: group_turns(&top_level),
            index: MultiIndex::build(records),
        };
        tracing::trace!(
            records = records.len(),
            turns = snapshot.turns.len(),
            "snapshot rebuilt"
        );
        snapshot
    }

    pub fn is_empty(&self) -> bool {
        self.index.record_count() == 0
    }

    /// First turn with this key. Prefer [`Snapshot::turn_of`] or a position
    /// when the role is known, since an assistant message id can equal a user uuid.
    pub fn turn(&self, key: &str) -> Option<&Turn> {
        self.turns.iter().find(|turn| turn.key == key)
    }

    pub fn turn_of(&self, role: Role, key: &str) -> Option<&Turn> {
        self.turns
            .iter()
            .find(|turn| turn.role == role && turn.key == key)
    }

    pub fn record(&self, uuid: &str) -> Option<&Record> {
        self.index.record(uuid).map(|record| &**record)
    }

    pub fn search(&self, query: &str) -> SearchResult {
        search_turns(&self.turns, &self.index, query)
    }

    pub fn filter(&self, facets: &FilterFacets) -> Vec<String> {
        filter_turns(&self.turns, facets)
    }

    /// Turns selected by both the facets and, when one is active, the query.
    pub fn visible_turns(&self, facets: &FilterFacets, query: &str) -> Vec<&Turn> {
        let search = self.search(query);
        self.turns
            .iter()
            .enumerate()
            .filter(|(position, turn)| {
                facets.matches(turn) && (!search.is_active() || search.contains_turn(*position))
            })
            .map(|(_, turn)| turn)
            .collect()
    }

    /// Tree spawned by one invocation, at any depth.
    pub fn subagent(&self, tool_use_id: &str) -> Option<SubAgentNode> {
        let task = self.index.tool_call(tool_use_id).map(|call| &call.tool_use);
        build_subagent_tree(&self.index, tool_use_id, task)
    }

    /// Trees rooted at Task calls of top-level turns.
    pub fn subagents(&self) -> Vec<SubAgentNode> {
        build_roots(&self.index, self.turns.iter().flat_map(Turn::tool_uses))
    }

    /// Invocations issued directly under a parent invocation, with their results.
    pub fn tool_calls_under(&self, parent_tool_use_id: &str) -> Vec<&ToolCallPair> {
        let mut seen = std::collections::HashSet::new();
        self.index
            .children(parent_tool_use_id)
            .iter()
            .flat_map(|record| record.tool_uses())
            .filter(|tool_use| seen.insert(tool_use.id.as_str()))
            .filter_map(|tool_use| self.index.tool_call(&tool_use.id))
            .collect()
    }

    /// Pairs for the invocations of one top-level turn.
    pub fn tool_calls_of(&self, turn: &Turn) -> Vec<&ToolCallPair> {
        turn.tool_uses()
            .filter_map(|tool_use| self.index.tool_call(&tool_use.id))
            .collect()
    }

    pub fn available_tools(&self) -> Vec<String> {
        available_tools(&self.turns)
    }

    pub fn available_models(&self) -> Vec<String> {
        available_models(&self.turns)
    }

    pub fn summary(&self) -> SessionSummary {
        summarize(&self.turns, &self.index)
    }
}
