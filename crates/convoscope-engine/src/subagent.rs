use convoscope_types::{SharedRecord, ToolUse, Turn, Usage};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::grouping::group_turns;
use crate::index::MultiIndex;
use crate::pairing::{ToolCallPair, pair_tool_calls};

/// Source of parent-id → child-records adjacency.
pub trait ChildLookup {
    fn children_of(&self, parent_tool_use_id: &str) -> &[SharedRecord];
}

impl ChildLookup for MultiIndex {
    fn children_of(&self, parent_tool_use_id: &str) -> &[SharedRecord] {
        self.children(parent_tool_use_id)
    }
}

impl ChildLookup for HashMap<String, Vec<SharedRecord>> {
    fn children_of(&self, parent_tool_use_id: &str) -> &[SharedRecord] {
        self.get(parent_tool_use_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// One sub-agent conversation, rooted at the Task invocation that spawned it.
///
/// Trees can be as deep as the log is long, so every walk over a node is
/// iterative, dropping included.
#[derive(Debug, PartialEq)]
pub struct SubAgentNode {
    pub parent_id: String,
    /// The spawning invocation, when it is present in the log
    pub task: Option<ToolUse>,
    /// Direct child records, in arrival order
    pub records: Vec<SharedRecord>,
    pub children: Vec<SubAgentNode>,
}

/// Aggregates over a sub-agent and everything nested below it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubAgentStats {
    pub records: usize,
    pub turns: usize,
    pub tool_calls: usize,
    pub failed_tool_calls: usize,
    pub pending_tool_calls: usize,
    /// Sub-agents below this one (not counting itself)
    pub nested_agents: usize,
    /// Levels of nesting below this node; 0 for a leaf
    pub depth: usize,
    pub usage: Usage,
}

impl SubAgentStats {
    fn absorb(&mut self, child: &SubAgentStats) {
        self.records += child.records;
        self.turns += child.turns;
        self.tool_calls += child.tool_calls;
        self.failed_tool_calls += child.failed_tool_calls;
        self.pending_tool_calls += child.pending_tool_calls;
        self.nested_agents += 1 + child.nested_agents;
        self.depth = self.depth.max(1 + child.depth);
        self.usage += &child.usage;
    }
}

impl SubAgentNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The nested conversation grouped into turns.
    pub fn turns(&self) -> Vec<Turn> {
        group_turns(&self.records)
    }

    /// Tool invocations of this sub-agent (not of its descendants) with their results.
    pub fn tool_calls(&self) -> Vec<ToolCallPair> {
        pair_tool_calls(&self.records)
    }

    pub fn description(&self) -> Option<&str> {
        self.task.as_ref().and_then(ToolUse::description)
    }

    /// Every node of this subtree in pre-order, paired with its depth below `self`.
    pub fn walk(&self) -> Vec<(usize, &SubAgentNode)> {
        let mut nodes = Vec::new();
        let mut stack = vec![(0, self)];
        while let Some((depth, node)) = stack.pop() {
            nodes.push((depth, node));
            stack.extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        }
        nodes
    }

    pub fn stats(&self) -> SubAgentStats {
        self.subtree_stats().swap_remove(0)
    }

    /// Subtree aggregates for every node, in `walk` order.
    pub fn subtree_stats(&self) -> Vec<SubAgentStats> {
        let nodes = self.walk();
        let mut stats: Vec<SubAgentStats> = nodes.iter().map(|(_, node)| node.own_stats()).collect();

        // In pre-order the parent of a node is the last node seen one level up
        let mut parents = Vec::with_capacity(nodes.len());
        let mut ancestors: Vec<usize> = Vec::new();
        for (idx, (depth, _)) in nodes.iter().enumerate() {
            ancestors.truncate(*depth);
            parents.push(ancestors.last().copied());
            ancestors.push(idx);
        }

        // Descendants follow their ancestor, so a reverse sweep folds children first
        for idx in (1..nodes.len()).rev() {
            if let Some(parent) = parents[idx] {
                let (head, tail) = stats.split_at_mut(idx);
                head[parent].absorb(&tail[0]);
            }
        }
        stats
    }

    fn own_stats(&self) -> SubAgentStats {
        let turns = self.turns();
        let calls = self.tool_calls();

        let mut stats = SubAgentStats {
            records: self.records.len(),
            turns: turns.len(),
            tool_calls: calls.len(),
            failed_tool_calls: calls.iter().filter(|c| c.is_error()).count(),
            pending_tool_calls: calls.iter().filter(|c| c.is_pending()).count(),
            ..Default::default()
        };
        for usage in turns.iter().filter_map(Turn::usage) {
            stats.usage += &usage;
        }
        stats
    }

    /// Number of nodes in this subtree, itself included.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(&node.children);
        }
        count
    }
}

impl Drop for SubAgentNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Reconstruct every sub-agent tree of a session from its flat record list.
///
/// Roots are Task invocations issued by top-level records that have at least
/// one child record.
pub fn build_subagent_forest(records: &[SharedRecord]) -> Vec<SubAgentNode> {
    let mut children: HashMap<String, Vec<SharedRecord>> = HashMap::new();
    for record in records {
        if let Some(parent) = record.parent_tool_use_id() {
            children
                .entry(parent.to_string())
                .or_default()
                .push(record.clone());
        }
    }

    let roots = records
        .iter()
        .filter(|record| record.is_top_level())
        .flat_map(|record| record.tool_uses());

    build_roots(&children, roots)
}

/// Materialize the tree under one invocation id, or `None` if nothing was spawned by it.
pub fn build_subagent_tree<L: ChildLookup>(
    lookup: &L,
    parent_id: &str,
    task: Option<&ToolUse>,
) -> Option<SubAgentNode> {
    if lookup.children_of(parent_id).is_empty() {
        return None;
    }
    materialize(lookup, parent_id, task)
}

pub(crate) fn build_roots<'a, L: ChildLookup>(
    lookup: &L,
    tool_uses: impl Iterator<Item = &'a ToolUse>,
) -> Vec<SubAgentNode> {
    let mut seen: HashSet<String> = HashSet::new();
    tool_uses
        .filter(|tool_use| tool_use.is_task())
        .filter(|tool_use| seen.insert(tool_use.id.clone()))
        .filter_map(|tool_use| build_subagent_tree(lookup, &tool_use.id, Some(tool_use)))
        .collect()
}

/// A node under construction: its spawned Task calls not yet descended into,
/// and the finished subtrees of those already visited.
struct Frame<'a> {
    parent_id: String,
    task: Option<ToolUse>,
    records: &'a [SharedRecord],
    pending: std::vec::IntoIter<&'a ToolUse>,
    children: Vec<SubAgentNode>,
}

impl<'a> Frame<'a> {
    fn open<L: ChildLookup>(lookup: &'a L, parent_id: &str, task: Option<&ToolUse>) -> Self {
        let records = lookup.children_of(parent_id);
        let mut seen = HashSet::new();
        let pending: Vec<&'a ToolUse> = records
            .iter()
            .flat_map(|record| record.tool_uses())
            .filter(|tool_use| tool_use.is_task() && seen.insert(tool_use.id.as_str()))
            .filter(|tool_use| !lookup.children_of(&tool_use.id).is_empty())
            .collect();

        Self {
            parent_id: parent_id.to_string(),
            task: task.cloned(),
            records,
            pending: pending.into_iter(),
            children: Vec::new(),
        }
    }

    fn close(self) -> SubAgentNode {
        SubAgentNode {
            parent_id: self.parent_id,
            task: self.task,
            records: self.records.to_vec(),
            children: self.children,
        }
    }
}

/// Depth-first construction on an explicit stack. `path` holds the invocation
/// ids of the open frames; an id seen again below itself is a cycle and is not
/// descended into.
fn materialize<L: ChildLookup>(
    lookup: &L,
    parent_id: &str,
    task: Option<&ToolUse>,
) -> Option<SubAgentNode> {
    let mut path: HashSet<String> = HashSet::from([parent_id.to_string()]);
    let mut stack = vec![Frame::open(lookup, parent_id, task)];

    while let Some(frame) = stack.last_mut() {
        if let Some(tool_use) = frame.pending.next() {
            if path.contains(&tool_use.id) {
                tracing::debug!(
                    parent_id = %frame.parent_id,
                    task_id = %tool_use.id,
                    "cyclic sub-agent link, not descending"
                );
                continue;
            }
            path.insert(tool_use.id.clone());
            stack.push(Frame::open(lookup, &tool_use.id, Some(tool_use)));
            continue;
        }

        let Some(done) = stack.pop() else { break };
        path.remove(&done.parent_id);
        let node = done.close();
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => return Some(node),
        }
    }
    None
}
