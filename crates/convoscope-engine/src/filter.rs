use convoscope_types::{Role, Turn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleFacet {
    #[default]
    All,
    Assistant,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFacet {
    #[default]
    All,
    /// At least one tool result flagged as error
    Errors,
    /// Issues a Task (sub-agent) invocation
    Subagent,
    /// Has at least one plain-text block
    Text,
}

/// Facet selection. Facets combine with AND; tool names combine with OR.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterFacets {
    #[serde(default)]
    pub role: RoleFacet,
    #[serde(default)]
    pub tools: BTreeSet<String>,
    #[serde(default)]
    pub status: StatusFacet,
    #[serde(default)]
    pub model: Option<String>,
}

impl FilterFacets {
    /// True when any facet deviates from its default.
    pub fn is_active(&self) -> bool {
        self != &FilterFacets::default()
    }

    pub fn matches(&self, turn: &Turn) -> bool {
        self.role_matches(turn)
            && self.tools_match(turn)
            && self.status_matches(turn)
            && self.model_matches(turn)
    }

    fn role_matches(&self, turn: &Turn) -> bool {
        match self.role {
            RoleFacet::All => true,
            RoleFacet::Assistant => turn.role == Role::Assistant,
            RoleFacet::User => turn.role == Role::User,
        }
    }

    fn tools_match(&self, turn: &Turn) -> bool {
        self.tools.is_empty()
            || turn
                .tool_uses()
                .any(|tool_use| self.tools.contains(&tool_use.name))
    }

    fn status_matches(&self, turn: &Turn) -> bool {
        match self.status {
            StatusFacet::All => true,
            StatusFacet::Errors => turn.has_error(),
            StatusFacet::Subagent => turn.has_task_call(),
            StatusFacet::Text => turn.has_text(),
        }
    }

    fn model_matches(&self, turn: &Turn) -> bool {
        match &self.model {
            None => true,
            Some(model) => turn.records.iter().any(|r| r.model() == Some(model.as_str())),
        }
    }
}

/// Keys of the turns satisfying every selected facet, in turn order.
pub fn filter_turns(turns: &[Turn], facets: &FilterFacets) -> Vec<String> {
    turns
        .iter()
        .filter(|turn| facets.matches(turn))
        .map(|turn| turn.key.clone())
        .collect()
}

/// Distinct tool names used across the turns, sorted.
pub fn available_tools(turns: &[Turn]) -> Vec<String> {
    let names: BTreeSet<&str> = turns
        .iter()
        .flat_map(|turn| turn.tool_uses())
        .map(|tool_use| tool_use.name.as_str())
        .collect();
    names.into_iter().map(String::from).collect()
}

/// Distinct model identifiers across the turns, sorted.
pub fn available_models(turns: &[Turn]) -> Vec<String> {
    let models: BTreeSet<&str> = turns.iter().flat_map(|turn| turn.models()).collect();
    models.into_iter().map(String::from).collect()
}
