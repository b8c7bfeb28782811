use convoscope_types::{ContentBlock, Record, Turn, UserContent, file_path_of};
use serde::Serialize;
use std::collections::HashSet;

use crate::index::MultiIndex;

/// Top-level turns matching a query, in turn order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Trimmed query; empty when search is inactive
    pub query: String,
    pub matched_keys: Vec<String>,
    /// Positions in the turn list, parallel to `matched_keys`. Keys alone can
    /// be ambiguous when a message id equals a user uuid.
    pub matched_turns: Vec<usize>,
}

impl SearchResult {
    pub fn inactive() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        !self.query.is_empty()
    }

    pub fn total_matches(&self) -> usize {
        self.matched_keys.len()
    }

    pub fn contains_turn(&self, position: usize) -> bool {
        self.matched_turns.contains(&position)
    }
}

/// Case-insensitive substring search over top-level turns.
///
/// A turn matches on its own text, tool names and tool inputs, on the content
/// or file path of tool results it carries, or on anything inside the
/// sub-agents its Task calls spawned, at any depth. Each turn is reported at
/// most once no matter how many places inside it match.
pub fn search_turns(turns: &[Turn], index: &MultiIndex, query: &str) -> SearchResult {
    let query = query.trim();
    if query.is_empty() {
        return SearchResult::inactive();
    }

    let matcher = Matcher {
        needle: query.to_lowercase(),
        index,
    };

    let (matched_turns, matched_keys) = turns
        .iter()
        .enumerate()
        .filter(|(_, turn)| matcher.turn_matches(turn))
        .map(|(position, turn)| (position, turn.key.clone()))
        .unzip();

    SearchResult {
        query: query.to_string(),
        matched_keys,
        matched_turns,
    }
}

struct Matcher<'a> {
    needle: String,
    index: &'a MultiIndex,
}

impl Matcher<'_> {
    fn turn_matches(&self, turn: &Turn) -> bool {
        if turn.blocks.iter().any(|block| self.block_matches(block)) {
            return true;
        }
        if turn.records.iter().any(|record| self.user_content_matches(record)) {
            return true;
        }

        self.subagents_match(turn)
    }

    fn record_matches(&self, record: &Record) -> bool {
        record
            .content_blocks()
            .iter()
            .any(|block| self.block_matches(block))
            || self.user_content_matches(record)
    }

    fn block_matches(&self, block: &ContentBlock) -> bool {
        match block {
            ContentBlock::Text { text } => self.contains(text),
            ContentBlock::ToolUse(tool_use) => {
                self.contains(&tool_use.name) || self.contains(&tool_use.input_text())
            }
            ContentBlock::Thinking { .. } | ContentBlock::Unknown => false,
        }
    }

    fn user_content_matches(&self, record: &Record) -> bool {
        let file_path = record.tool_use_result().and_then(file_path_of);

        record.user_content().iter().any(|content| match content {
            UserContent::Text { text } => self.contains(text),
            UserContent::ToolResult(result) => {
                self.contains(&result.text()) || file_path.is_some_and(|path| self.contains(path))
            }
            UserContent::Unknown => false,
        })
    }

    /// Walks every sub-agent spawned under `turn` on an explicit stack.
    /// `visited` spans the whole turn: a sub-agent is examined once, and a
    /// cycle ends at the repeated id.
    fn subagents_match(&self, turn: &Turn) -> bool {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut pending: Vec<&str> = turn.task_calls().map(|task| task.id.as_str()).collect();

        while let Some(task_id) = pending.pop() {
            if !visited.insert(task_id) {
                continue;
            }

            let children = self.index.children(task_id);
            if children.iter().any(|record| self.record_matches(record)) {
                return true;
            }

            pending.extend(
                children
                    .iter()
                    .flat_map(|record| record.tool_uses())
                    .filter(|tool_use| tool_use.is_task())
                    .map(|tool_use| tool_use.id.as_str()),
            );
        }
        false
    }

    fn contains(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.needle)
    }
}

/// Cursor over an ordered match list, for "next / previous match" with wraparound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchNavigator {
    keys: Vec<String>,
    current: Option<usize>,
}

impl MatchNavigator {
    pub fn new(result: &SearchResult) -> Self {
        Self {
            keys: result.matched_keys.clone(),
            current: None,
        }
    }

    /// Replace the match list, keeping the cursor on the same turn if it still matches.
    pub fn refresh(&mut self, result: &SearchResult) {
        let current_key = self.current_key().map(String::from);
        self.keys = result.matched_keys.clone();
        self.current = current_key.and_then(|key| self.keys.iter().position(|k| *k == key));
    }

    pub fn next_match(&mut self) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        let len = self.keys.len();
        self.current = Some(match self.current {
            None => 0,
            Some(idx) => (idx + 1) % len,
        });
        self.current_key()
    }

    pub fn previous_match(&mut self) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        let len = self.keys.len();
        self.current = Some(match self.current {
            None => len - 1,
            Some(idx) => (idx + len - 1) % len,
        });
        self.current_key()
    }

    pub fn current_key(&self) -> Option<&str> {
        self.current
            .and_then(|idx| self.keys.get(idx))
            .map(String::as_str)
    }

    /// 1-based position and total, e.g. `(3, 7)` for "3 of 7".
    pub fn position(&self) -> Option<(usize, usize)> {
        self.current.map(|idx| (idx + 1, self.keys.len()))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(keys: &[&str]) -> SearchResult {
        SearchResult {
            query: "q".to_string(),
            matched_keys: keys.iter().map(|k| k.to_string()).collect(),
            matched_turns: (0..keys.len()).collect(),
        }
    }

    #[test]
    fn test_navigator_wraps_forward_and_back() {
        let mut nav = MatchNavigator::new(&result(&["a", "b", "c"]));

        assert_eq!(nav.position(), None);
        assert_eq!(nav.next_match(), Some("a"));
        assert_eq!(nav.next_match(), Some("b"));
        assert_eq!(nav.next_match(), Some("c"));
        assert_eq!(nav.next_match(), Some("a"));
        assert_eq!(nav.previous_match(), Some("c"));
        assert_eq!(nav.position(), Some((3, 3)));
    }

    #[test]
    fn test_navigator_previous_from_start_goes_to_last() {
        let mut nav = MatchNavigator::new(&result(&["a", "b"]));
        assert_eq!(nav.previous_match(), Some("b"));
    }

    #[test]
    fn test_navigator_empty() {
        let mut nav = MatchNavigator::new(&SearchResult::inactive());
        assert!(nav.is_empty());
        assert_eq!(nav.next_match(), None);
        assert_eq!(nav.previous_match(), None);
    }

    #[test]
    fn test_navigator_refresh_keeps_current_turn() {
        let mut nav = MatchNavigator::new(&result(&["a", "b", "c"]));
        nav.next_match();
        nav.next_match();
        assert_eq!(nav.current_key(), Some("b"));

        nav.refresh(&result(&["x", "b"]));
        assert_eq!(nav.position(), Some((2, 2)));

        nav.refresh(&result(&["x"]));
        assert_eq!(nav.current_key(), None);
        assert_eq!(nav.next_match(), Some("x"));
    }
}
