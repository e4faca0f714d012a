//! Parsing behavior across formats, including the round-trip property.

use prism_core::models::OutputFormat;
use prism_parser::OutputParser;
use proptest::prelude::*;
use serde_json::{json, Value};

#[test]
fn markdown_strips_fence_and_thinking_tags() {
    let parser = OutputParser::new();
    let raw = "```markdown\n<thinking>draft</thinking># Title\n\nBody text.\n```";
    let outcome = parser.parse(raw, OutputFormat::Markdown, None);
    assert!(outcome.valid);
    assert_eq!(outcome.content, "# Title\n\nBody text.");
}

#[test]
fn markdown_without_fence_is_trimmed_only() {
    let parser = OutputParser::new();
    let outcome = parser.parse("  plain text  ", OutputFormat::Markdown, None);
    assert!(outcome.valid);
    assert_eq!(outcome.content, "plain text");
}

#[test]
fn json_from_fenced_block() {
    let parser = OutputParser::new();
    let raw = "Sure, here you go:\n```json\n{\"tags\": [\"a\", \"b\"]}\n```";
    let outcome = parser.parse(raw, OutputFormat::Json, None);
    assert!(outcome.valid);
    assert_eq!(outcome.parsed, Some(json!({"tags": ["a", "b"]})));
}

#[test]
fn json_content_is_pretty_printed() {
    let parser = OutputParser::new();
    let outcome = parser.parse("{\"a\":1}", OutputFormat::Json, None);
    assert!(outcome.valid);
    assert_eq!(outcome.content, "{\n  \"a\": 1\n}");
}

#[test]
fn json_failure_reports_fixed_message() {
    let parser = OutputParser::new();
    let outcome = parser.parse("no data here", OutputFormat::Json, None);
    assert!(!outcome.valid);
    assert_eq!(outcome.errors, vec!["No valid JSON found in output"]);
    assert_eq!(outcome.content, "no data here");
    assert!(outcome.parsed.is_none());
}

#[test]
fn schema_violations_fail_with_paths() {
    let parser = OutputParser::new();
    let schema = json!({
        "type": "object",
        "required": ["summary"],
        "properties": { "summary": { "type": "string" } }
    });
    let outcome = parser.parse("{\"summary\": 42}", OutputFormat::Structured, Some(&schema));
    assert!(!outcome.valid);
    assert!(outcome.parsed.is_some());
    assert!(outcome.errors.iter().any(|e| e.starts_with("/summary: ")));
}

#[test]
fn structured_without_schema_degrades_to_json() {
    let parser = OutputParser::new();
    let outcome = parser.parse("[1, 2, 3]", OutputFormat::Structured, None);
    assert!(outcome.valid);
    assert_eq!(outcome.parsed, Some(json!([1, 2, 3])));
}

#[test]
fn repair_fixes_common_model_mistakes() {
    let parser = OutputParser::new();
    assert_eq!(
        parser.repair_json("{items: [1, 2,],}"),
        Some("{\"items\": [1, 2]}".to_string())
    );
    assert_eq!(parser.repair_json("not even close"), None);
}

#[test]
fn extract_fields_projects_paths() {
    let parser = OutputParser::new();
    let data = json!({"meta": {"model": "m1"}, "score": 0.8});
    let fields = parser.extract_fields(&data, &["meta.model", "score", "missing"]);
    assert_eq!(fields.len(), 2);
    assert_eq!(fields.get("meta.model"), Some(&json!("m1")));
}

/// Arbitrary JSON object, the shape transformations actually emit. Kept as
/// an object at the top level: extraction prefers a `{...}` span over a
/// `[...]` span, so a bare array of objects would resolve to its first
/// embedded object rather than the array.
fn arb_json_object() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
    ];
    let node = leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::hash_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    });
    prop::collection::hash_map("[a-z]{1,6}", node, 0..4)
        .prop_map(|m| Value::Object(m.into_iter().collect()))
}

proptest! {
    #[test]
    fn json_round_trips_through_the_parser(value in arb_json_object()) {
        let parser = OutputParser::new();
        let serialized = serde_json::to_string(&value).unwrap();
        let outcome = parser.parse(&serialized, OutputFormat::Json, None);
        prop_assert!(outcome.valid);
        prop_assert_eq!(outcome.parsed, Some(value));
    }
}
