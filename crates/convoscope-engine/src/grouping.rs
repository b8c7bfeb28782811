use convoscope_types::{Role, SharedRecord, Turn};
use std::collections::HashMap;

/// Collapse a flat record list into conversation turns.
///
/// Turns come out in first-appearance order of their group key. Records inside a
/// turn, and the concatenated content blocks, keep arrival order. The turn's
/// parent id and session id are taken from its first record.
pub fn group_turns(records: &[SharedRecord]) -> Vec<Turn> {
    let mut turns: Vec<Turn> = Vec::new();
    let mut positions: HashMap<(Role, &str), usize> = HashMap::new();

    for record in records {
        let slot = (record.role(), record.group_key());

        if let Some(&idx) = positions.get(&slot) {
            let turn = &mut turns[idx];
            turn.blocks.extend(record.content_blocks().iter().cloned());
            turn.records.push(record.clone());
            continue;
        }

        positions.insert(slot, turns.len());
        turns.push(Turn {
            key: record.group_key().to_string(),
            role: record.role(),
            records: vec![record.clone()],
            blocks: record.content_blocks().to_vec(),
            parent_tool_use_id: record.parent_tool_use_id().map(String::from),
            session_id: record.session_id().to_string(),
        });
    }

    turns
}

#[cfg(test)]
mod tests {
    use super::*;
    use convoscope_parser::parse_line;
    use convoscope_testing::lines;
    use std::sync::Arc;

    fn records(raw: &[String]) -> Vec<SharedRecord> {
        raw.iter()
            .filter_map(|line| parse_line(line).into_record())
            .map(Arc::new)
            .collect()
    }

    #[test]
    fn test_chunks_of_one_message_merge() {
        let records = records(&[
            lines::assistant_text("a1", "m1", "Hello"),
            lines::assistant_text("a2", "m1", " world"),
        ]);

        let turns = group_turns(&records);

        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].key, "m1");
        assert_eq!(turns[0].blocks.len(), 2);
        assert_eq!(turns[0].text(), "Hello world");
        assert_eq!(turns[0].records.len(), 2);
    }

    #[test]
    fn test_user_records_are_singletons() {
        let records = records(&[
            lines::assistant_tool_use("a1", "m1", "t1", "Read", serde_json::json!({})),
            lines::user_tool_result("u1", "t1", "data", false),
            lines::user_tool_result("u2", "t1", "again", false),
        ]);

        let turns = group_turns(&records);
        let keys: Vec<&str> = turns.iter().map(|t| t.key.as_str()).collect();

        assert_eq!(keys, ["m1", "u1", "u2"]);
        assert_eq!(turns[1].role, Role::User);
        assert!(turns[1].blocks.is_empty());
    }

    #[test]
    fn test_interleaved_groups_keep_first_appearance_order() {
        let records = records(&[
            lines::assistant_text("a1", "m1", "one"),
            lines::assistant_text("a2", "m2", "two"),
            lines::assistant_text("a3", "m1", "three"),
        ]);

        let turns = group_turns(&records);

        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].text(), "onethree");
        assert_eq!(turns[1].text(), "two");
    }

    #[test]
    fn test_turn_takes_parent_from_first_record() {
        let records = records(&[convoscope_testing::LineBuilder::assistant("a1", "m1")
            .parent("task1")
            .text("nested")
            .build()]);

        let turns = group_turns(&records);
        assert_eq!(turns[0].parent_tool_use_id.as_deref(), Some("task1"));
        assert_eq!(turns[0].session_id, lines::SESSION_ID);
    }
}
