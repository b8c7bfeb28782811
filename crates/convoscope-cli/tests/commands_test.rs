mod common;

use common::TestFixture;
use predicates::prelude::*;

#[test]
fn test_summary_plain() {
    let fixture = TestFixture::new();
    let log = fixture.nested();

    fixture
        .command()
        .arg("summary")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("File:        nested.jsonl"))
        .stdout(predicate::str::contains("Turns:       4 (2 assistant, 2 user)"))
        .stdout(predicate::str::contains("Sub-agents:  2"))
        .stdout(predicate::str::contains("Tokens:      440 in / 74 out"));
}

#[test]
fn test_summary_json() {
    let fixture = TestFixture::new();
    let log = fixture.nested();
    let log = log.to_string_lossy();

    let value = fixture.json(&["summary", &log]);
    assert_eq!(value["file"]["file_name"], "nested.jsonl");
    assert_eq!(value["file"]["record_count"], 10);
    assert_eq!(value["ingest"]["accepted"], 10);
    assert_eq!(value["summary"]["tool_calls"], 4);
    assert_eq!(value["summary"]["failed_tool_calls"], 1);
    assert_eq!(value["summary"]["usage"]["input_tokens"], 440);
}

#[test]
fn test_turns_with_facets() {
    let fixture = TestFixture::new();
    let log = fixture.nested();
    let log = log.to_string_lossy();

    let all = fixture.json(&["turns", &log]);
    assert_eq!(all.as_array().map(Vec::len), Some(4));

    let errors = fixture.json(&["turns", &log, "--status", "errors"]);
    assert_eq!(errors[0]["key"], "u-b1");
    assert_eq!(errors.as_array().map(Vec::len), Some(1));

    let tools = fixture.json(&["turns", &log, "--tool", "Bash", "--tool", "Task"]);
    let keys: Vec<&str> = tools
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|turn| turn["key"].as_str())
        .collect();
    assert_eq!(keys, ["m1", "m2"]);

    let none = fixture.json(&["turns", &log, "--role", "user", "--model", "claude-haiku-4"]);
    assert_eq!(none.as_array().map(Vec::len), Some(0));
}

#[test]
fn test_search_attributes_nested_match() {
    let fixture = TestFixture::new();
    let log = fixture.nested();
    let log = log.to_string_lossy();

    let value = fixture.json(&["search", &log, "needle"]);
    assert_eq!(value["total_matches"], 1);
    assert_eq!(value["matched_keys"][0], "m1");

    fixture
        .command()
        .args(["search", &*log, "LIB.RS"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 matches for \"LIB.RS\""))
        .stdout(predicate::str::contains("[2/2] u-b1"));
}

#[test]
fn test_tree_and_tools() {
    let fixture = TestFixture::new();
    let log = fixture.nested();
    let log = log.to_string_lossy();

    let tree = fixture.json(&["tree", &log]);
    assert_eq!(tree[0]["parent_id"], "task1");
    assert_eq!(tree[0]["depth"], 0);
    assert!(tree[0].get("spawned_by").is_none());
    assert_eq!(tree[0]["stats"]["nested_agents"], 1);
    assert_eq!(tree[1]["parent_id"], "task2");
    assert_eq!(tree[1]["depth"], 1);
    assert_eq!(tree[1]["spawned_by"], "task1");

    let nested = fixture.json(&["tools", &log, "--parent", "task1"]);
    assert_eq!(nested[0]["id"], "r1");
    assert_eq!(nested[0]["file_path"], "/repo/src/lib.rs");
    assert_eq!(nested[1]["status"], "ok");

    fixture
        .command()
        .args(["tools", &*log])
        .assert()
        .success()
        .stdout(predicate::str::contains("b1  Bash  error"));

    fixture
        .command()
        .args(["tools", &*log, "--parent", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no sub-agent records under invocation 'nope'"));
}

#[test]
fn test_empty_file_fails() {
    let fixture = TestFixture::new();
    let log = fixture.log("empty.jsonl", "  \n\n");

    fixture
        .command()
        .arg("summary")
        .arg(&log)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("empty input"));
}

#[test]
fn test_invalid_file_fails() {
    let fixture = TestFixture::new();
    let log = fixture.log("junk.jsonl", "not json\n{\"type\":\"system\"}\n");

    fixture
        .command()
        .arg("turns")
        .arg(&log)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no valid records found"));
}

#[test]
fn test_missing_file_fails() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .args(["summary", "/definitely/not/here.jsonl"])
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("Error: IO error"));
}

#[test]
fn test_config_file_is_honored() {
    let fixture = TestFixture::new();
    std::fs::write(fixture.config_path(), "[ingest]\nbatch_size = 3\n[log]\nlevel = \"debug\"\n")
        .unwrap();
    let log = fixture.nested();

    fixture
        .command()
        .arg("summary")
        .arg(&log)
        .assert()
        .success()
        .stderr(predicate::str::contains("batch flushed"));
}
