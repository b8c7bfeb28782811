use convoscope_engine::{FilterFacets, MatchNavigator, SearchResult, Snapshot};
use convoscope_types::Turn;

use super::{PREVIEW_CHARS, Palette, truncate_for_display};

/// Turn text, or for a user turn without text, its first tool result.
pub fn preview(turn: &Turn) -> String {
    let text = turn.text();
    if !text.trim().is_empty() {
        return truncate_for_display(&text, PREVIEW_CHARS);
    }

    turn.tool_results()
        .next()
        .map(|result| {
            format!(
                "← {}: {}",
                result.tool_use_id,
                truncate_for_display(&result.text(), PREVIEW_CHARS)
            )
        })
        .unwrap_or_default()
}

pub fn turn_line(turn: &Turn, palette: Palette) -> String {
    let mut line = format!("{}  {}", palette.key(&turn.key), turn.role);

    let preview = preview(turn);
    if !preview.is_empty() {
        line.push_str("  ");
        line.push_str(&preview);
    }

    let tools: Vec<&str> = turn.tool_uses().map(|tool_use| tool_use.name.as_str()).collect();
    if !tools.is_empty() {
        line.push_str(&format!("  [{}]", tools.join(", ")));
    }

    if turn.has_error() {
        line.push_str("  ");
        line.push_str(&palette.error("(error)"));
    }

    line
}

pub fn render_turns(turns: &[&Turn], palette: Palette) -> String {
    if turns.is_empty() {
        return "No turns match".to_string();
    }
    turns
        .iter()
        .map(|turn| turn_line(turn, palette))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Narrow a search result to turns that also pass the facets.
pub fn apply_facets(result: SearchResult, snapshot: &Snapshot, facets: &FilterFacets) -> SearchResult {
    let (matched_keys, matched_turns) = result
        .matched_keys
        .into_iter()
        .zip(result.matched_turns)
        .filter(|(_, position)| {
            snapshot
                .turns
                .get(*position)
                .is_some_and(|turn| facets.matches(turn))
        })
        .unzip();
    SearchResult {
        query: result.query,
        matched_keys,
        matched_turns,
    }
}

pub fn render_search(result: &SearchResult, snapshot: &Snapshot, palette: Palette) -> String {
    if !result.is_active() {
        return "Empty query".to_string();
    }
    if result.total_matches() == 0 {
        return format!("No matches for \"{}\"", result.query);
    }

    let noun = if result.total_matches() == 1 { "match" } else { "matches" };
    let mut lines = vec![format!(
        "{} {} for \"{}\"",
        result.total_matches(),
        noun,
        result.query
    )];

    let mut navigator = MatchNavigator::new(result);
    for _ in 0..navigator.len() {
        navigator.next_match();
        let Some((position, total)) = navigator.position() else {
            continue;
        };
        let Some(turn) = result
            .matched_turns
            .get(position - 1)
            .and_then(|idx| snapshot.turns.get(*idx))
        else {
            continue;
        };
        lines.push(format!(
            "{} {}",
            palette.dim(&format!("[{}/{}]", position, total)),
            turn_line(turn, palette)
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::test_support::snapshot;
    use convoscope_engine::RoleFacet;
    use convoscope_testing::fixtures;

    #[test]
    fn test_render_turns() {
        let snapshot = snapshot(&fixtures::nested_session());
        let turns: Vec<&Turn> = snapshot.turns.iter().collect();

        insta::assert_snapshot!(render_turns(&turns, Palette::new(false)), @r"
        m1  assistant  Let me look around  [Task]
        u-task1  user  ← task1: Survey complete
        m2  assistant  All done  [Bash]
        u-b1  user  ← b1: Diff in src/lib.rs  (error)
        ");
    }

    #[test]
    fn test_render_search() {
        let snapshot = snapshot(&fixtures::nested_session());
        let result = snapshot.search("lib.rs");

        insta::assert_snapshot!(render_search(&result, &snapshot, Palette::new(false)), @r#"
        2 matches for "lib.rs"
        [1/2] m1  assistant  Let me look around  [Task]
        [2/2] u-b1  user  ← b1: Diff in src/lib.rs  (error)
        "#);
    }

    #[test]
    fn test_search_with_facets() {
        let snapshot = snapshot(&fixtures::nested_session());
        let facets = FilterFacets {
            role: RoleFacet::User,
            ..Default::default()
        };

        let result = apply_facets(snapshot.search("lib.rs"), &snapshot, &facets);
        assert_eq!(result.matched_keys, ["u-b1"]);
        assert_eq!(
            render_search(&result, &snapshot, Palette::new(false)),
            "1 match for \"lib.rs\"\n[1/1] u-b1  user  ← b1: Diff in src/lib.rs  (error)"
        );
    }

    #[test]
    fn test_no_matches() {
        let snapshot = snapshot(&fixtures::nested_session());
        let result = snapshot.search("zebra");
        assert_eq!(
            render_search(&result, &snapshot, Palette::new(false)),
            "No matches for \"zebra\""
        );
        assert_eq!(render_turns(&[], Palette::new(false)), "No turns match");
    }
}
