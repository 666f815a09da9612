//! Position-preserving parser for lightweight tag markup.
//!
//! Two grammars are built in: bracket tags (`[b]bold[/b]`, `[url=https://x]`) and
//! angle tags in the shape of HTML (`<p class="x">`). Both run on the same scanning
//! engine and produce the same [`Document`]: a tree of tag and text nodes whose
//! offsets all index into the original source.
//!
//! Parsing never fails. Markup that cannot be completed is kept as text, and the
//! leaves of the tree always reconstruct the input byte for byte.
//!
//! ```
//! use tagmark_parser::{TagPolicies, parse_bracket};
//!
//! let document = parse_bracket("[b]bold[/b] text", &TagPolicies::new());
//! let tag = document.children()[0];
//! assert_eq!(document.tag_name(tag), Some("b"));
//! assert_eq!(document.body(tag), Some("bold"));
//! ```
//!
//! Per-tag behaviour comes from [`TagPolicies`]. Caller policies are layered over the
//! grammar's defaults ([`BRACKET_DEFAULTS`], [`ANGLE_DEFAULTS`]), caller entries
//! winning per name.
use tracing::instrument;

mod error;
pub mod grammar;
mod model;
mod offsets;
mod policy;
mod scanner;

#[cfg(test)]
mod proptests;

pub use error::{Conflict, Error};
pub use model::{Attribute, Document, Node, NodeId, Span, TagNode, TextNode};
pub use offsets::{OffsetEntry, OffsetLedger};
pub use policy::{ANGLE_DEFAULTS, BRACKET_DEFAULTS, TagAttributes, TagPolicies};

use grammar::{AngleGrammar, BracketGrammar, Grammar};

/// Builds a [`Document`] from source text.
pub trait Parser {
    /// Parse `source` with `policies` layered over this parser's defaults.
    fn build_document(&self, source: &str, policies: &TagPolicies) -> Document;
}

/// Parser for `[tag]...[/tag]` markup.
#[derive(Clone, Copy, Debug, Default)]
pub struct BracketParser;

/// Parser for `<tag>...</tag>` markup.
#[derive(Clone, Copy, Debug, Default)]
pub struct AngleParser;

impl Parser for BracketParser {
    #[instrument(skip_all, fields(len = source.len()))]
    fn build_document(&self, source: &str, policies: &TagPolicies) -> Document {
        build::<BracketGrammar>(source, policies)
    }
}

impl Parser for AngleParser {
    #[instrument(skip_all, fields(len = source.len()))]
    fn build_document(&self, source: &str, policies: &TagPolicies) -> Document {
        build::<AngleGrammar>(source, policies)
    }
}

fn build<G: Grammar>(source: &str, policies: &TagPolicies) -> Document {
    if policies.is_empty() {
        return scanner::scan::<G>(source, G::defaults());
    }
    let merged = policies.merged_over(G::defaults());
    scanner::scan::<G>(source, &merged)
}

/// Parse bracket markup. Shorthand for [`BracketParser::build_document`].
#[must_use]
pub fn parse_bracket(source: &str, policies: &TagPolicies) -> Document {
    BracketParser.build_document(source, policies)
}

/// Parse angle markup. Shorthand for [`AngleParser::build_document`].
#[must_use]
pub fn parse_angle(source: &str, policies: &TagPolicies) -> Document {
    AngleParser.build_document(source, policies)
}
