//! The scanning engine shared by every grammar.
//!
//! One forward pass over the source drives the grammar's transition function one
//! character at a time. The engine reacts to the [`StateKind`] of each transition:
//! it opens tags, records names, values and attributes, closes tags and flushes
//! text runs. Malformed markup never aborts the pass; see [`recovery`] for how it
//! degrades to text.
use std::marker::PhantomData;

use tracing::instrument;

use crate::{
    Document, TagPolicies,
    grammar::{Grammar, StateKind},
    model::Span,
};

mod builder;
mod recovery;

use builder::{Built, OpenTag, TreeBuilder, names_match};

/// Scan `source` with grammar `G` under `policies`.
///
/// Never fails: every byte of the input ends up covered by exactly one leaf of the
/// returned tree.
#[instrument(skip_all, fields(grammar = G::NAME, len = source.len()))]
pub(crate) fn scan<G: Grammar>(source: &str, policies: &TagPolicies) -> Document {
    let mut scanner = Scanner::<G>::new(source, policies);
    for (index, ch) in source.char_indices() {
        scanner.step(index, ch);
    }
    scanner.complete()
}

struct Scanner<'a, G: Grammar> {
    tree: TreeBuilder<'a>,
    state: G::State,
    /// Cleared inside a pre-formatted body, where only its own closer is markup.
    parsing_enabled: bool,
    /// The top of the stack is a tag whose opening markup is still being read.
    opening: bool,
    text_begin: Option<usize>,
    tag_start: usize,
    attribute_name_begin: usize,
    pending_attribute: Option<Span>,
    value_begin: usize,
    closing_name: Span,
    grammar: PhantomData<G>,
}

impl<'a, G: Grammar> Scanner<'a, G> {
    fn new(source: &'a str, policies: &'a TagPolicies) -> Self {
        Self {
            tree: TreeBuilder::new(source, policies),
            state: G::START,
            parsing_enabled: true,
            opening: false,
            text_begin: None,
            tag_start: 0,
            attribute_name_begin: 0,
            pending_attribute: None,
            value_begin: 0,
            closing_name: Span::default(),
            grammar: PhantomData,
        }
    }

    fn source(&self) -> &'a str {
        self.tree.source
    }

    fn next_state(&self, state: G::State, ch: char) -> G::State {
        let next = G::next(state, ch);
        // escapes are markup too, so a pre-formatted body keeps them verbatim
        if !self.parsing_enabled && G::kind(next) == StateKind::Escape {
            G::TEXT
        } else {
            next
        }
    }

    fn step(&mut self, index: usize, ch: char) {
        let mut previous = self.state;
        let mut next = self.next_state(previous, ch);
        if G::kind(next) == StateKind::Unexpected {
            tracing::trace!(index, ?ch, state = ?previous, "unexpected character");
            self.recover_unexpected();
            previous = G::TEXT;
            next = self.next_state(G::TEXT, ch);
        }
        self.transition(G::kind(previous), G::kind(next), index, ch);
        self.state = next;
    }

    fn transition(&mut self, previous: StateKind, next: StateKind, index: usize, ch: char) {
        self.leave(previous, next, index);
        self.enter(previous, next, index, ch);
    }

    /// Bookkeeping for the construct that ends right before `index`.
    fn leave(&mut self, previous: StateKind, next: StateKind, index: usize) {
        if previous == next {
            return;
        }
        match previous {
            StateKind::TagName if self.opening => self.record_tag_name(index),
            StateKind::AttributeName if self.opening => {
                self.pending_attribute = Some(Span::new(self.attribute_name_begin, index));
            }
            StateKind::ClosingTagName => self.closing_name.end = index,
            StateKind::Value if self.opening => self.record_value(self.value_begin, index, 0),
            StateKind::QuotedValue if self.opening && next == StateKind::ValueQuoteEnd => {
                self.record_value(self.value_begin + 1, index, 1);
            }
            StateKind::ValueAssign
                if self.opening
                    && matches!(
                        next,
                        StateKind::TagBodyOpen
                            | StateKind::AttributeSpace
                            | StateKind::SelfClosingMarker
                    ) =>
            {
                self.record_value(index, index, 0);
            }
            StateKind::Text
            | StateKind::Escape
            | StateKind::TagOpen
            | StateKind::TagName
            | StateKind::AttributeSpace
            | StateKind::AttributeName
            | StateKind::ValueAssign
            | StateKind::Value
            | StateKind::QuotedValue
            | StateKind::ValueQuoteEnd
            | StateKind::SelfClosingMarker
            | StateKind::SelfClosed
            | StateKind::TagBodyOpen
            | StateKind::ClosingTagBegin
            | StateKind::ClosingTagSpace
            | StateKind::ClosingTagEnd
            | StateKind::Unexpected
            | StateKind::Complete => {}
        }
    }

    /// Bookkeeping for the construct that starts at `index`.
    fn enter(&mut self, previous: StateKind, next: StateKind, index: usize, ch: char) {
        match next {
            StateKind::Text | StateKind::Escape => {
                self.text_begin.get_or_insert(index);
            }
            StateKind::TagOpen => {
                self.tag_start = index;
                self.text_begin.get_or_insert(index);
            }
            StateKind::TagName if previous != next && self.parsing_enabled => self.open_tag(),
            StateKind::AttributeName if previous != next && self.opening => {
                self.commit_bare_attribute();
                self.attribute_name_begin = index;
            }
            StateKind::Value | StateKind::QuotedValue if previous != next => {
                self.value_begin = index;
            }
            StateKind::SelfClosingMarker if self.opening => self.commit_bare_attribute(),
            StateKind::TagBodyOpen if self.opening => {
                self.commit_bare_attribute();
                self.finish_opening(index + ch.len_utf8(), false);
            }
            StateKind::SelfClosed if self.opening => {
                self.finish_opening(index + ch.len_utf8(), true);
            }
            StateKind::ClosingTagName if previous != next => {
                self.closing_name = Span::new(index, index);
            }
            StateKind::ClosingTagEnd => self.close_tag(index + ch.len_utf8()),
            StateKind::TagName
            | StateKind::AttributeSpace
            | StateKind::AttributeName
            | StateKind::ValueAssign
            | StateKind::Value
            | StateKind::QuotedValue
            | StateKind::ValueQuoteEnd
            | StateKind::SelfClosingMarker
            | StateKind::SelfClosed
            | StateKind::TagBodyOpen
            | StateKind::ClosingTagBegin
            | StateKind::ClosingTagName
            | StateKind::ClosingTagSpace
            | StateKind::Unexpected
            | StateKind::Complete => {}
        }
    }

    fn flush_text(&mut self, end: usize) {
        if let Some(begin) = self.text_begin.take() {
            self.tree.insert_text(begin, end);
        }
    }

    fn open_tag(&mut self) {
        let begin = self.tag_start;
        self.flush_text(begin);
        if let Some(parent) = self.tree.stack.last_mut() {
            parent.body_end = parent.body_end.max(begin);
        }
        self.tree.stack.push(OpenTag::new(begin));
        self.opening = true;
        self.pending_attribute = None;
    }

    fn record_tag_name(&mut self, end: usize) {
        let source = self.source();
        let policy = self
            .tree
            .policy_for(source.get(self.tag_start + 1..end).unwrap_or_default());
        if let Some(tag) = self.tree.stack.last_mut() {
            tag.name_end = end;
            tag.policy = policy;
        }
    }

    fn commit_bare_attribute(&mut self) {
        if let Some(name) = self.pending_attribute.take() {
            let source = self.source();
            if let Some(tag) = self.tree.stack.last_mut() {
                tag.set_attribute(source, name, Span::new(name.end, name.end));
            }
        }
    }

    /// Store a value read from `raw_begin..raw_end`, trimmed.
    ///
    /// `quote_len` is the width of an opening quote before `raw_begin`; it counts as
    /// consumed syntax in the attribute ledger along with the leading whitespace.
    fn record_value(&mut self, raw_begin: usize, raw_end: usize, quote_len: usize) {
        let source = self.source();
        let raw = source.get(raw_begin..raw_end).unwrap_or_default();
        let leading = raw.len() - raw.trim_start().len();
        let begin = raw_begin + leading;
        let value = Span::new(begin, begin + raw.trim().len());
        let syntax = quote_len + leading;
        if syntax > 0 {
            self.tree
                .attribute_offsets
                .add(begin, isize::try_from(syntax).unwrap_or(isize::MAX));
        }
        let name = self.pending_attribute.take();
        if let Some(tag) = self.tree.stack.last_mut() {
            match name {
                Some(name) => tag.set_attribute(source, name, value),
                None => tag.value = Some(value),
            }
        }
    }

    /// The opening markup of the top tag ends at `end`.
    fn finish_opening(&mut self, end: usize, self_closed: bool) {
        self.opening = false;
        self.text_begin = None;
        let Some(tag) = self.tree.stack.last_mut() else {
            return;
        };
        tag.body_begin = end;
        tag.body_end = end;
        tag.end = end;
        let policy = tag.policy;

        if self_closed || policy.standalone {
            if let Some(tag) = self.tree.stack.pop() {
                self.tree.insert(Built::Tag(tag));
            }
            return;
        }
        self.close_implicit_sibling();
        if policy.has_pre_formatted_body {
            tracing::trace!(tag = self.tree.top_name(), "entering pre-formatted body");
            self.parsing_enabled = false;
        }
    }

    /// A new tag directly inside a same-name implicit-close tag is its sibling.
    fn close_implicit_sibling(&mut self) {
        let source = self.source();
        let stack = &self.tree.stack;
        let [.., below, top] = stack.as_slice() else {
            return;
        };
        if !below.policy.does_not_require_closing_tag
            || !names_match(below.name(source), top.name(source))
        {
            return;
        }
        let (Some(top), Some(mut sibling)) = (self.tree.stack.pop(), self.tree.stack.pop()) else {
            return;
        };
        sibling.body_end = sibling.body_end.max(top.begin);
        sibling.end = sibling.body_end;
        self.tree.insert(Built::Tag(sibling));
        self.tree.stack.push(top);
    }

    /// A closing tag spanning `tag_start..end` was read.
    fn close_tag(&mut self, end: usize) {
        let source = self.source();
        let closer = Span::new(self.tag_start, end);
        let name = source
            .get(self.closing_name.begin..self.closing_name.end)
            .unwrap_or_default();

        if !self.parsing_enabled {
            if self.tree.top_name().is_some_and(|top| names_match(top, name)) {
                self.close_top(closer);
                self.parsing_enabled = true;
            }
            return;
        }
        if self.tree.stack.is_empty() {
            tracing::debug!(name, begin = closer.begin, "closing tag without opening tag");
            return;
        }

        self.flush_text(closer.begin);
        self.close_implicit_until(closer.begin, Some(name));
        match self.tree.top_name() {
            Some(top) if names_match(top, name) => self.close_top(closer),
            Some(_) => self.close_mismatched(closer),
            None => {
                tracing::debug!(name, begin = closer.begin, "closing tag without opening tag");
                self.text_begin = Some(closer.begin);
            }
        }
    }

    /// Close the top tag with its matching closer.
    fn close_top(&mut self, closer: Span) {
        self.flush_text(closer.begin);
        let Some(mut tag) = self.tree.stack.pop() else {
            return;
        };
        tag.body_end = closer.begin;
        tag.end = closer.end;
        if tag.policy.has_pre_formatted_body {
            tag.collapse_body();
            self.tree.offsets.discard_range(tag.body_begin, tag.body_end);
            self.tree
                .attribute_offsets
                .discard_range(tag.body_begin, tag.body_end);
        }
        self.tree.insert(Built::Tag(tag));
    }

    /// Close implicit-close tags at `at` until the top is explicit or named `name`.
    fn close_implicit_until(&mut self, at: usize, name: Option<&str>) {
        let source = self.source();
        while let Some(top) = self.tree.stack.last() {
            let stop = !top.policy.does_not_require_closing_tag
                || name.is_some_and(|name| names_match(top.name(source), name));
            if stop {
                break;
            }
            let Some(mut tag) = self.tree.stack.pop() else {
                break;
            };
            tag.body_end = tag.body_end.max(at);
            tag.end = tag.body_end;
            self.tree.insert(Built::Tag(tag));
        }
    }

    fn complete(mut self) -> Document {
        self.finish_at_end_of_input();
        self.state = G::COMPLETE;
        self.tree.finish()
    }
}
