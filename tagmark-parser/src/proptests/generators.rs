//! Input generators for property-based testing
//!
//! Arbitrary strings exercise the "never panics" guarantees; markup-shaped strings
//! built from tag fragments reach the nesting and recovery paths far more often.
#![allow(clippy::expect_used)]
use proptest::prelude::*;

/// Any string, control characters and multi-byte characters included.
pub fn any_source() -> impl Strategy<Value = String> {
    prop::string::string_regex(".*").expect("Failed to create any string strategy")
}

/// Concatenated bracket fragments, well-formed or not.
pub fn bracket_source() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("[b]".to_string()),
            Just("[/b]".to_string()),
            Just("[I]".to_string()),
            Just("[/i]".to_string()),
            Just("[list]".to_string()),
            Just("[/list]".to_string()),
            Just("[*]".to_string()),
            Just("[code]".to_string()),
            Just("[/code]".to_string()),
            Just("[hr]".to_string()),
            Just("[url=https://x.y/z]".to_string()),
            Just("[quote=\" Ann \" date=1]".to_string()),
            Just("[/url]".to_string()),
            Just("[".to_string()),
            Just("]".to_string()),
            Just("\\".to_string()),
            Just("=".to_string()),
            Just("\"".to_string()),
            Just("\n".to_string()),
            Just("é".to_string()),
            prop::string::string_regex(r"[a-z /=]{1,6}").expect("Failed to create text chunk"),
        ],
        0..24,
    )
    .prop_map(|chunks| chunks.concat())
}

/// Concatenated angle fragments, well-formed or not.
pub fn angle_source() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("<p>".to_string()),
            Just("</p>".to_string()),
            Just("<B class='x'>".to_string()),
            Just("</b>".to_string()),
            Just("<br>".to_string()),
            Just("<img src=\"a\"/>".to_string()),
            Just("<input disabled>".to_string()),
            Just("<script>".to_string()),
            Just("</script>".to_string()),
            Just("<!-- ".to_string()),
            Just(" -->".to_string()),
            Just("<!DOCTYPE html>".to_string()),
            Just("<".to_string()),
            Just(">".to_string()),
            Just("/".to_string()),
            Just("'".to_string()),
            Just("😀".to_string()),
            prop::string::string_regex(r"[a-z =]{1,6}").expect("Failed to create text chunk"),
        ],
        0..24,
    )
    .prop_map(|chunks| chunks.concat())
}
