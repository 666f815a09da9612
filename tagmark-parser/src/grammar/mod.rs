//! State-transition tables for the two built-in grammars.
//!
//! Each grammar is a closed set of states and one pure transition function from
//! `(state, char)` to the next state. The scanner never looks at grammar states
//! directly: it asks the grammar which [`StateKind`] a state belongs to and does its
//! bookkeeping per kind. Tables know characters, the scanner knows kinds.
use std::fmt;

use crate::TagPolicies;

mod angle;
mod bracket;

pub use angle::{AngleGrammar, AngleState};
pub use bracket::{BracketGrammar, BracketState};

/// What a grammar state means to the scanner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateKind {
    /// Literal content, including comments and markup declarations.
    Text,
    /// An escape character; the next character is literal.
    Escape,
    /// The opening delimiter of any tag.
    TagOpen,
    TagName,
    /// Whitespace between a tag name and its attributes, or between attributes.
    AttributeSpace,
    AttributeName,
    /// The `=` introducing a value, plus any whitespace after it.
    ValueAssign,
    /// An unquoted value.
    Value,
    /// A quoted value; the state is entered on the opening quote.
    QuotedValue,
    /// The closing quote of a quoted value.
    ValueQuoteEnd,
    /// The `/` of a `/>` self-closing marker.
    SelfClosingMarker,
    /// The delimiter that ends a self-closed tag.
    SelfClosed,
    /// The delimiter that ends an opening tag; the body starts after it.
    TagBodyOpen,
    /// The `/` right after the opening delimiter of a closing tag.
    ClosingTagBegin,
    ClosingTagName,
    /// Whitespace between a closing tag name and its delimiter.
    ClosingTagSpace,
    ClosingTagEnd,
    /// The character cannot continue the current construct.
    Unexpected,
    /// End of input.
    Complete,
}

/// A grammar table the scanner can be instantiated with.
pub trait Grammar {
    type State: Copy + Eq + fmt::Debug;

    /// Name used in logs.
    const NAME: &'static str;
    /// State before the first character.
    const START: Self::State;
    /// Plain text; the scanner re-scans from here after an unexpected character.
    const TEXT: Self::State;
    /// Terminal state driven once at end of input.
    const COMPLETE: Self::State;

    fn next(state: Self::State, ch: char) -> Self::State;

    fn kind(state: Self::State) -> StateKind;

    /// Tag policies every parse with this grammar starts from.
    fn defaults() -> &'static TagPolicies;
}

fn is_inline_space(ch: char) -> bool {
    matches!(ch, ' ' | '\t')
}
