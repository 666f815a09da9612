use super::{Grammar, StateKind, is_inline_space};
use crate::{BRACKET_DEFAULTS, TagPolicies};

/// States of the `[tag=value key="v"]...[/tag]` grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BracketState {
    Start,
    Text,
    Escape,
    TagOpen,
    TagName,
    SimpleValueAssign,
    SimpleValue,
    SimpleValueDoubleQuoted,
    SimpleValueSingleQuoted,
    SimpleValueQuoteEnd,
    AttributeSpace,
    AttributeName,
    AttributeAssign,
    AttributeValue,
    AttributeValueDoubleQuoted,
    AttributeValueSingleQuoted,
    AttributeValueQuoteEnd,
    TagBodyOpen,
    ClosingTagBegin,
    ClosingTagName,
    ClosingTagEnd,
    Unexpected,
    Complete,
}

/// Bracket markup: `[b]`, `[url=https://x]`, `[quote author="a b"]`, `[/b]`.
///
/// A backslash makes the following character literal.
#[derive(Clone, Copy, Debug, Default)]
pub struct BracketGrammar;

fn is_name_char(ch: char) -> bool {
    !ch.is_whitespace() && !matches!(ch, '[' | ']' | '=' | '/' | '"' | '\'' | '\\')
}

fn is_unquoted_value_char(ch: char) -> bool {
    !ch.is_whitespace() && !matches!(ch, '[' | ']' | '"' | '\'')
}

fn text(ch: char) -> BracketState {
    match ch {
        '[' => BracketState::TagOpen,
        '\\' => BracketState::Escape,
        _ => BracketState::Text,
    }
}

impl Grammar for BracketGrammar {
    type State = BracketState;

    const NAME: &'static str = "bracket";
    const START: BracketState = BracketState::Start;
    const TEXT: BracketState = BracketState::Text;
    const COMPLETE: BracketState = BracketState::Complete;

    #[allow(clippy::match_same_arms)]
    fn next(state: BracketState, ch: char) -> BracketState {
        use BracketState as S;

        match state {
            S::Start | S::Text | S::TagBodyOpen | S::ClosingTagEnd | S::Unexpected => text(ch),
            S::Escape => S::Text,
            S::TagOpen => match ch {
                '/' => S::ClosingTagBegin,
                c if is_name_char(c) => S::TagName,
                _ => S::Unexpected,
            },
            S::TagName => match ch {
                ']' => S::TagBodyOpen,
                '=' => S::SimpleValueAssign,
                c if is_inline_space(c) => S::AttributeSpace,
                c if is_name_char(c) => S::TagName,
                _ => S::Unexpected,
            },
            S::SimpleValueAssign => match ch {
                '"' => S::SimpleValueDoubleQuoted,
                '\'' => S::SimpleValueSingleQuoted,
                ']' => S::TagBodyOpen,
                '[' | '\n' | '\r' => S::Unexpected,
                _ => S::SimpleValue,
            },
            S::SimpleValue => match ch {
                ']' => S::TagBodyOpen,
                '[' | '\n' | '\r' => S::Unexpected,
                _ => S::SimpleValue,
            },
            S::SimpleValueDoubleQuoted => match ch {
                '"' => S::SimpleValueQuoteEnd,
                _ => S::SimpleValueDoubleQuoted,
            },
            S::SimpleValueSingleQuoted => match ch {
                '\'' => S::SimpleValueQuoteEnd,
                _ => S::SimpleValueSingleQuoted,
            },
            S::SimpleValueQuoteEnd | S::AttributeValueQuoteEnd => match ch {
                ']' => S::TagBodyOpen,
                c if is_inline_space(c) => S::AttributeSpace,
                _ => S::Unexpected,
            },
            S::AttributeSpace => match ch {
                ']' => S::TagBodyOpen,
                c if is_inline_space(c) => S::AttributeSpace,
                c if is_name_char(c) => S::AttributeName,
                _ => S::Unexpected,
            },
            S::AttributeName => match ch {
                '=' => S::AttributeAssign,
                c if is_name_char(c) => S::AttributeName,
                _ => S::Unexpected,
            },
            S::AttributeAssign => match ch {
                '"' => S::AttributeValueDoubleQuoted,
                '\'' => S::AttributeValueSingleQuoted,
                ']' => S::TagBodyOpen,
                c if is_inline_space(c) => S::AttributeSpace,
                c if is_unquoted_value_char(c) => S::AttributeValue,
                _ => S::Unexpected,
            },
            S::AttributeValue => match ch {
                ']' => S::TagBodyOpen,
                c if is_inline_space(c) => S::AttributeSpace,
                c if is_unquoted_value_char(c) => S::AttributeValue,
                _ => S::Unexpected,
            },
            S::AttributeValueDoubleQuoted => match ch {
                '"' => S::AttributeValueQuoteEnd,
                _ => S::AttributeValueDoubleQuoted,
            },
            S::AttributeValueSingleQuoted => match ch {
                '\'' => S::AttributeValueQuoteEnd,
                _ => S::AttributeValueSingleQuoted,
            },
            S::ClosingTagBegin => match ch {
                c if is_name_char(c) => S::ClosingTagName,
                _ => S::Unexpected,
            },
            S::ClosingTagName => match ch {
                ']' => S::ClosingTagEnd,
                c if is_name_char(c) => S::ClosingTagName,
                _ => S::Unexpected,
            },
            S::Complete => S::Complete,
        }
    }

    fn kind(state: BracketState) -> StateKind {
        use BracketState as S;

        match state {
            S::Start | S::Text => StateKind::Text,
            S::Escape => StateKind::Escape,
            S::TagOpen => StateKind::TagOpen,
            S::TagName => StateKind::TagName,
            S::SimpleValueAssign | S::AttributeAssign => StateKind::ValueAssign,
            S::SimpleValue | S::AttributeValue => StateKind::Value,
            S::SimpleValueDoubleQuoted
            | S::SimpleValueSingleQuoted
            | S::AttributeValueDoubleQuoted
            | S::AttributeValueSingleQuoted => StateKind::QuotedValue,
            S::SimpleValueQuoteEnd | S::AttributeValueQuoteEnd => StateKind::ValueQuoteEnd,
            S::AttributeSpace => StateKind::AttributeSpace,
            S::AttributeName => StateKind::AttributeName,
            S::TagBodyOpen => StateKind::TagBodyOpen,
            S::ClosingTagBegin => StateKind::ClosingTagBegin,
            S::ClosingTagName => StateKind::ClosingTagName,
            S::ClosingTagEnd => StateKind::ClosingTagEnd,
            S::Unexpected => StateKind::Unexpected,
            S::Complete => StateKind::Complete,
        }
    }

    fn defaults() -> &'static TagPolicies {
        &BRACKET_DEFAULTS
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn run(input: &str) -> Vec<BracketState> {
        let mut state = BracketGrammar::START;
        input
            .chars()
            .map(|ch| {
                state = BracketGrammar::next(state, ch);
                state
            })
            .collect()
    }

    fn last(input: &str) -> BracketState {
        run(input).last().copied().unwrap_or(BracketGrammar::START)
    }

    #[test]
    fn simple_tag() {
        use BracketState as S;
        assert_eq!(
            run("[b]x[/b]"),
            vec![
                S::TagOpen,
                S::TagName,
                S::TagBodyOpen,
                S::Text,
                S::TagOpen,
                S::ClosingTagBegin,
                S::ClosingTagName,
                S::ClosingTagEnd,
            ]
        );
    }

    #[rstest::rstest]
    #[case::simple_value("[url=https://x.y/z?a=b]", BracketState::TagBodyOpen)]
    #[case::quoted_simple_value("[quote=\"a [b] c\"]", BracketState::TagBodyOpen)]
    #[case::named_attributes("[img w=10 h='20']", BracketState::TagBodyOpen)]
    #[case::value_then_attribute("[quote=\"x\" date=1]", BracketState::TagBodyOpen)]
    #[case::empty_value("[color=]", BracketState::TagBodyOpen)]
    #[case::escape("\\[", BracketState::Text)]
    #[case::escaped_backslash("\\\\[", BracketState::TagOpen)]
    #[case::unterminated_quote("[q=\"x]", BracketState::SimpleValueDoubleQuoted)]
    fn accepted_sequences(#[case] input: &str, #[case] expected: BracketState) {
        assert_eq!(last(input), expected);
    }

    #[rstest::rstest]
    #[case::bare_key("[img alt]")]
    #[case::empty_name("[]")]
    #[case::double_open("[[")]
    #[case::space_before_name("[ b]")]
    #[case::newline_in_name("[b\n")]
    #[case::newline_in_value("[url=a\n")]
    #[case::nested_open_in_value("[url=a[")]
    #[case::closer_with_space("[/b ]")]
    #[case::empty_closer("[/]")]
    #[case::junk_after_quote("[q=\"x\"y]")]
    fn unexpected_sequences(#[case] input: &str) {
        assert!(run(input).contains(&BracketState::Unexpected), "{input:?}");
    }

    #[test]
    fn unexpected_resumes_as_text() {
        assert_eq!(
            BracketGrammar::next(BracketState::Unexpected, '['),
            BracketState::TagOpen
        );
        assert_eq!(
            BracketGrammar::next(BracketState::Unexpected, 'a'),
            BracketState::Text
        );
    }

    #[test]
    fn kinds_cover_value_states() {
        assert_eq!(
            BracketGrammar::kind(BracketState::SimpleValueSingleQuoted),
            StateKind::QuotedValue
        );
        assert_eq!(
            BracketGrammar::kind(BracketState::AttributeAssign),
            StateKind::ValueAssign
        );
        assert_eq!(BracketGrammar::kind(BracketState::Start), StateKind::Text);
    }
}
