#![allow(clippy::indexing_slicing, clippy::expect_used)]
use std::path::{Path, PathBuf};

use tagmark_parser::{
    AngleParser, BracketParser, Parser, TagAttributes, TagPolicies, parse_angle,
    parse_bracket,
};

type Error = Box<dyn std::error::Error>;

fn run_fixture_test(path: &Path, parser: &dyn Parser) -> Result<(), Error> {
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or("Invalid fixture file name")?;
    let source = std::fs::read_to_string(path)?;
    let expected: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path.with_extension("json"))?)?;

    let document = parser.build_document(&source, &TagPolicies::new());
    let actual = serde_json::to_value(&document)?;

    pretty_assertions::assert_eq!(
        expected,
        actual,
        "tree mismatch for fixture: {file_name}"
    );
    Ok(())
}

#[rstest::rstest]
#[tracing_test::traced_test]
fn test_bracket_fixtures(#[files("tests/fixtures/bracket/*.bb")] path: PathBuf) -> Result<(), Error> {
    run_fixture_test(&path, &BracketParser)
}

#[rstest::rstest]
#[tracing_test::traced_test]
fn test_angle_fixtures(#[files("tests/fixtures/angle/*.html")] path: PathBuf) -> Result<(), Error> {
    run_fixture_test(&path, &AngleParser)
}

#[test]
fn test_policies_loaded_from_json() -> Result<(), Error> {
    let policies = TagPolicies::from_json(r#"{"smile": {"standalone": true}}"#)?;
    policies.validate()?;
    let document = parse_bracket("hi [smile] there", &policies);
    let tags: Vec<&str> = document
        .children()
        .iter()
        .filter_map(|&id| document.tag_name(id))
        .collect();
    assert_eq!(tags, vec!["smile"]);
    assert_eq!(document.children().len(), 3);
    Ok(())
}

#[test]
fn test_defaults_still_apply_with_caller_policies() {
    let policies: TagPolicies = [("spoiler", TagAttributes::new().transform_new_lines())]
        .into_iter()
        .collect();
    let document = parse_bracket("[code][b][/code]", &policies);
    let code = document.children()[0];
    assert_eq!(document.children_of(code).len(), 1);
    assert_eq!(document.body(code), Some("[b]"));
}

#[test]
fn test_parent_lookup_and_raw_strings() {
    let document = parse_angle("<ul><li>one</li></ul>", &TagPolicies::new());
    let mut text = None;
    document.walk(|id, node| {
        if node.is_text() {
            text = Some(id);
        }
    });
    let text = text.expect("one text node");
    assert_eq!(document.raw_string(text), "one");
    assert_eq!(document.parent_tag_name(text), Some("li"));
    let list = document.children()[0];
    assert_eq!(document.raw_string(list), "<ul><li>one</li></ul>");
}

#[test]
fn test_offset_ledger_maps_plain_text_back() {
    let source = "[b] bbb [/b]!";
    let document = parse_bracket(source, &TagPolicies::new());
    let offsets = document.offsets();
    assert_eq!(offsets.total(), 7);
    // " bbb !" is what remains without markup
    assert_eq!(offsets.map_to_source(5), 12);
    assert_eq!(source.get(12..13), Some("!"));
    assert_eq!(offsets.compute_offset_from_index(3), 3);
}

#[test]
fn test_walks_visit_in_document_order() {
    let source = "a[b]b[i]c[/i][/b]d";
    let document = parse_bracket(source, &TagPolicies::new());
    let mut begins = Vec::new();
    document.walk(|_, node| begins.push(node.begin()));
    assert_eq!(begins, vec![0, 1, 4, 5, 8, 17]);

    let mut names = Vec::new();
    document.walk_tags(|id, _| names.push(document.tag_name(id).unwrap_or_default().to_string()));
    assert_eq!(names, vec!["b", "i"]);
}
