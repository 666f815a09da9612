use super::{Grammar, StateKind};
use crate::{ANGLE_DEFAULTS, TagPolicies};

/// States of the `<tag key="v">...</tag>` grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AngleState {
    Start,
    Text,
    TagOpen,
    TagName,
    AttributeSpace,
    AttributeName,
    AttributeNameEnd,
    AttributeAssign,
    AttributeValue,
    AttributeValueDoubleQuoted,
    AttributeValueSingleQuoted,
    AttributeValueQuoteEnd,
    SelfClosingMarker,
    SelfClosed,
    TagBodyOpen,
    ClosingTagBegin,
    ClosingTagName,
    ClosingTagSpace,
    ClosingTagEnd,
    MarkupDeclaration,
    CommentOpenDash,
    Comment,
    CommentCloseDash,
    CommentCloseDashDash,
    Unexpected,
    Complete,
}

/// Angle markup in the shape of HTML: `<p class="x">`, `<br/>`, `</p>`, `<input disabled>`.
///
/// Comments and `<!...>` declarations are kept as literal text.
#[derive(Clone, Copy, Debug, Default)]
pub struct AngleGrammar;

fn is_name_start(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | ':' | '.')
}

fn is_attribute_name_char(ch: char) -> bool {
    !ch.is_whitespace() && !matches!(ch, '<' | '>' | '/' | '=' | '"' | '\'')
}

fn text(ch: char) -> AngleState {
    match ch {
        '<' => AngleState::TagOpen,
        _ => AngleState::Text,
    }
}

impl Grammar for AngleGrammar {
    type State = AngleState;

    const NAME: &'static str = "angle";
    const START: AngleState = AngleState::Start;
    const TEXT: AngleState = AngleState::Text;
    const COMPLETE: AngleState = AngleState::Complete;

    #[allow(clippy::match_same_arms)]
    fn next(state: AngleState, ch: char) -> AngleState {
        use AngleState as S;

        match state {
            S::Start
            | S::Text
            | S::TagBodyOpen
            | S::SelfClosed
            | S::ClosingTagEnd
            | S::Unexpected => text(ch),
            S::TagOpen => match ch {
                '/' => S::ClosingTagBegin,
                '!' => S::MarkupDeclaration,
                c if is_name_start(c) => S::TagName,
                _ => S::Unexpected,
            },
            S::TagName => match ch {
                '>' => S::TagBodyOpen,
                '/' => S::SelfClosingMarker,
                c if c.is_whitespace() => S::AttributeSpace,
                c if is_name_char(c) => S::TagName,
                _ => S::Unexpected,
            },
            S::AttributeSpace => match ch {
                '>' => S::TagBodyOpen,
                '/' => S::SelfClosingMarker,
                c if c.is_whitespace() => S::AttributeSpace,
                c if is_attribute_name_char(c) => S::AttributeName,
                _ => S::Unexpected,
            },
            S::AttributeName => match ch {
                '=' => S::AttributeAssign,
                '>' => S::TagBodyOpen,
                '/' => S::SelfClosingMarker,
                c if c.is_whitespace() => S::AttributeNameEnd,
                c if is_attribute_name_char(c) => S::AttributeName,
                _ => S::Unexpected,
            },
            S::AttributeNameEnd => match ch {
                '=' => S::AttributeAssign,
                '>' => S::TagBodyOpen,
                '/' => S::SelfClosingMarker,
                c if c.is_whitespace() => S::AttributeNameEnd,
                c if is_attribute_name_char(c) => S::AttributeName,
                _ => S::Unexpected,
            },
            S::AttributeAssign => match ch {
                '"' => S::AttributeValueDoubleQuoted,
                '\'' => S::AttributeValueSingleQuoted,
                c if c.is_whitespace() => S::AttributeAssign,
                '>' | '<' | '=' | '`' => S::Unexpected,
                _ => S::AttributeValue,
            },
            S::AttributeValue => match ch {
                '>' => S::TagBodyOpen,
                c if c.is_whitespace() => S::AttributeSpace,
                '"' | '\'' | '<' | '=' | '`' => S::Unexpected,
                _ => S::AttributeValue,
            },
            S::AttributeValueDoubleQuoted => match ch {
                '"' => S::AttributeValueQuoteEnd,
                _ => S::AttributeValueDoubleQuoted,
            },
            S::AttributeValueSingleQuoted => match ch {
                '\'' => S::AttributeValueQuoteEnd,
                _ => S::AttributeValueSingleQuoted,
            },
            S::AttributeValueQuoteEnd => match ch {
                '>' => S::TagBodyOpen,
                '/' => S::SelfClosingMarker,
                c if c.is_whitespace() => S::AttributeSpace,
                _ => S::Unexpected,
            },
            S::SelfClosingMarker => match ch {
                '>' => S::SelfClosed,
                _ => S::Unexpected,
            },
            S::ClosingTagBegin => match ch {
                c if is_name_start(c) => S::ClosingTagName,
                _ => S::Unexpected,
            },
            S::ClosingTagName => match ch {
                '>' => S::ClosingTagEnd,
                c if c.is_whitespace() => S::ClosingTagSpace,
                c if is_name_char(c) => S::ClosingTagName,
                _ => S::Unexpected,
            },
            S::ClosingTagSpace => match ch {
                '>' => S::ClosingTagEnd,
                c if c.is_whitespace() => S::ClosingTagSpace,
                _ => S::Unexpected,
            },
            // `<!` then either a comment or a declaration running to `>`
            S::MarkupDeclaration => match ch {
                '-' => S::CommentOpenDash,
                '>' => S::Text,
                _ => S::MarkupDeclaration,
            },
            S::CommentOpenDash => match ch {
                '-' => S::Comment,
                '>' => S::Text,
                _ => S::MarkupDeclaration,
            },
            S::Comment => match ch {
                '-' => S::CommentCloseDash,
                _ => S::Comment,
            },
            S::CommentCloseDash => match ch {
                '-' => S::CommentCloseDashDash,
                _ => S::Comment,
            },
            S::CommentCloseDashDash => match ch {
                '>' => S::Text,
                '-' => S::CommentCloseDashDash,
                _ => S::Comment,
            },
            S::Complete => S::Complete,
        }
    }

    fn kind(state: AngleState) -> StateKind {
        use AngleState as S;

        match state {
            S::Start
            | S::Text
            | S::MarkupDeclaration
            | S::CommentOpenDash
            | S::Comment
            | S::CommentCloseDash
            | S::CommentCloseDashDash => StateKind::Text,
            S::TagOpen => StateKind::TagOpen,
            S::TagName => StateKind::TagName,
            S::AttributeSpace | S::AttributeNameEnd => StateKind::AttributeSpace,
            S::AttributeName => StateKind::AttributeName,
            S::AttributeAssign => StateKind::ValueAssign,
            S::AttributeValue => StateKind::Value,
            S::AttributeValueDoubleQuoted | S::AttributeValueSingleQuoted => {
                StateKind::QuotedValue
            }
            S::AttributeValueQuoteEnd => StateKind::ValueQuoteEnd,
            S::SelfClosingMarker => StateKind::SelfClosingMarker,
            S::SelfClosed => StateKind::SelfClosed,
            S::TagBodyOpen => StateKind::TagBodyOpen,
            S::ClosingTagBegin => StateKind::ClosingTagBegin,
            S::ClosingTagName => StateKind::ClosingTagName,
            S::ClosingTagSpace => StateKind::ClosingTagSpace,
            S::ClosingTagEnd => StateKind::ClosingTagEnd,
            S::Unexpected => StateKind::Unexpected,
            S::Complete => StateKind::Complete,
        }
    }

    fn defaults() -> &'static TagPolicies {
        &ANGLE_DEFAULTS
    }
}
