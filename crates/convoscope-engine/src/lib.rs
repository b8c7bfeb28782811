// Engine - reconstructs conversations from flat record lists.
// Everything here is a pure function of the records handed in; the runtime
// layer owns ingestion and calls back into `Snapshot::build` per batch.

pub mod filter;
pub mod grouping;
pub mod index;
pub mod pairing;
pub mod search;
pub mod snapshot;
pub mod subagent;
pub mod summary;

pub use filter::{
    FilterFacets, RoleFacet, StatusFacet, available_models, available_tools, filter_turns,
};
pub use grouping::group_turns;
pub use index::MultiIndex;
pub use pairing::{PairedResult, ToolCallPair, pair_tool_calls};
pub use search::{MatchNavigator, SearchResult, search_turns};
pub use snapshot::Snapshot;
pub use subagent::{
    ChildLookup, SubAgentNode, SubAgentStats, build_subagent_forest, build_subagent_tree,
};
pub use summary::{SessionSummary, summarize};
