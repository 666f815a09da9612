//! Scanner invariants checked with property-based testing
//!
//! - P0: scanning never panics and never loses a byte
//! - P1: tag offsets are ordered and children nest inside their parent's body
//! - P2: tree hygiene (no adjacent text siblings, consistent parent links)

use proptest::prelude::*;

use super::generators::*;
use crate::{Document, Node, NodeId, TagPolicies, parse_angle, parse_bracket};

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 512,
        max_shrink_iters: 10000,
        .. ProptestConfig::default()
    })]

    // ====================================================================
    // P0: CRITICAL INVARIANTS
    // ====================================================================

    #[test]
    fn bracket_never_panics(input in any_source()) {
        let _document = parse_bracket(&input, &TagPolicies::new());
    }

    #[test]
    fn angle_never_panics(input in any_source()) {
        let _document = parse_angle(&input, &TagPolicies::new());
    }

    #[test]
    fn bracket_is_lossless(input in bracket_source()) {
        let document = parse_bracket(&input, &TagPolicies::new());
        prop_assert_eq!(reconstruct(&document), input);
    }

    #[test]
    fn angle_is_lossless(input in angle_source()) {
        let document = parse_angle(&input, &TagPolicies::new());
        prop_assert_eq!(reconstruct(&document), input);
    }

    #[test]
    fn arbitrary_input_is_lossless(input in any_source()) {
        let bracket = parse_bracket(&input, &TagPolicies::new());
        prop_assert_eq!(reconstruct(&bracket), input.as_str());
        let angle = parse_angle(&input, &TagPolicies::new());
        prop_assert_eq!(reconstruct(&angle), input.as_str());
    }

    // ====================================================================
    // P1: STRUCTURAL INVARIANTS
    // ====================================================================

    #[test]
    fn bracket_offsets_are_ordered(input in bracket_source()) {
        verify_ranges(&parse_bracket(&input, &TagPolicies::new()))?;
    }

    #[test]
    fn angle_offsets_are_ordered(input in angle_source()) {
        verify_ranges(&parse_angle(&input, &TagPolicies::new()))?;
    }

    // ====================================================================
    // P2: TREE HYGIENE
    // ====================================================================

    #[test]
    fn bracket_tree_is_tidy(input in bracket_source()) {
        verify_tidy(&parse_bracket(&input, &TagPolicies::new()))?;
    }

    #[test]
    fn angle_tree_is_tidy(input in angle_source()) {
        verify_tidy(&parse_angle(&input, &TagPolicies::new()))?;
    }

    #[test]
    fn document_always_serializes(input in bracket_source()) {
        let document = parse_bracket(&input, &TagPolicies::new());
        prop_assert!(serde_json::to_string(&document).is_ok());
    }
}

// ====================================================================
// Helper functions for invariant verification
// ====================================================================

/// Rebuild the source from the tree: tag markup around children, text as is.
fn reconstruct(document: &Document) -> String {
    fn push(document: &Document, ids: &[NodeId], out: &mut String) {
        for &id in ids {
            match document.node(id) {
                Some(Node::Tag(tag)) => {
                    out.push_str(document.string(tag.begin, tag.body_begin).unwrap_or("<?>"));
                    push(document, tag.children(), out);
                    out.push_str(document.string(tag.body_end, tag.end).unwrap_or("<?>"));
                }
                Some(Node::Text(text)) => {
                    out.push_str(document.string(text.begin, text.end).unwrap_or("<?>"));
                }
                None => {}
            }
        }
    }
    let mut out = String::with_capacity(document.len());
    push(document, document.children(), &mut out);
    out
}

fn verify_ranges(document: &Document) -> Result<(), TestCaseError> {
    let source = document.source();
    let mut result = Ok(());
    document.walk(|id, node| {
        if result.is_err() {
            return;
        }
        result = check_node(document, source, id, node);
    });
    result
}

fn check_node(
    document: &Document,
    source: &str,
    id: NodeId,
    node: &Node,
) -> Result<(), TestCaseError> {
    prop_assert!(node.begin() <= node.end());
    prop_assert!(node.end() <= source.len());
    prop_assert!(source.is_char_boundary(node.begin()));
    prop_assert!(source.is_char_boundary(node.end()));
    let Node::Tag(tag) = node else {
        return Ok(());
    };
    prop_assert!(
        tag.begin <= tag.name_end
            && tag.name_end <= tag.body_begin
            && tag.body_begin <= tag.body_end
            && tag.body_end <= tag.end,
        "unordered offsets for {:?}",
        document.raw_string(id)
    );
    let mut cursor = tag.body_begin;
    for &child in tag.children() {
        let Some(child) = document.node(child) else {
            return Err(TestCaseError::fail("dangling child id"));
        };
        prop_assert!(child.begin() >= cursor, "children overlap or are out of order");
        cursor = child.end();
    }
    prop_assert!(cursor <= tag.body_end, "child extends past the body");
    Ok(())
}

fn verify_tidy(document: &Document) -> Result<(), TestCaseError> {
    verify_siblings(document, document.children(), None)?;
    let mut result = Ok(());
    document.walk_tags(|id, tag| {
        if result.is_ok() {
            result = verify_siblings(document, tag.children(), Some(id));
        }
    });
    result
}

fn verify_siblings(
    document: &Document,
    ids: &[NodeId],
    parent: Option<NodeId>,
) -> Result<(), TestCaseError> {
    let mut previous_was_text = false;
    for &id in ids {
        let Some(node) = document.node(id) else {
            return Err(TestCaseError::fail("dangling child id"));
        };
        prop_assert_eq!(node.parent(), parent);
        prop_assert!(
            !(previous_was_text && node.is_text()),
            "adjacent text siblings"
        );
        prop_assert!(!node.is_text() || !node.is_empty(), "empty text node");
        previous_was_text = node.is_text();
    }
    Ok(())
}
