//! Malformed markup handling.
//!
//! Nothing here fails. A construct that cannot be completed turns into literal text
//! spanning exactly the characters it consumed, so the leaves of the tree still cover
//! the whole input.
use super::{Scanner, builder::Built};
use crate::{
    grammar::{Grammar, StateKind},
    model::Span,
};

impl<G: Grammar> Scanner<'_, G> {
    /// The current character cannot continue the markup being read.
    ///
    /// A tag still in its opening markup is dropped from the stack and its characters
    /// become pending text; the caller re-scans the offending character as text.
    pub(super) fn recover_unexpected(&mut self) {
        self.pending_attribute = None;
        if !self.opening {
            return;
        }
        self.opening = false;
        self.abandon_opening_tag("malformed opening tag kept as text");
    }

    fn abandon_opening_tag(&mut self, reason: &'static str) {
        if let Some(tag) = self.tree.stack.pop() {
            tracing::debug!(begin = tag.begin, name = tag.name(self.source()), reason);
            self.tree.offsets.discard_from(tag.begin);
            self.tree.attribute_offsets.discard_from(tag.begin);
            self.text_begin = Some(tag.begin);
        }
    }

    /// A closing tag that matches neither the top tag nor an implicit-close tag.
    ///
    /// The top tag is abandoned: it becomes text running through the end of the
    /// closer, taking its already-built children with it.
    pub(super) fn close_mismatched(&mut self, closer: Span) {
        if let Some(tag) = self.tree.stack.pop() {
            tracing::debug!(
                begin = tag.begin,
                closer = self.source().get(closer.begin..closer.end),
                "closing tag does not match open tag"
            );
            self.tree.degrade(&tag, closer.end);
        }
        self.text_begin = None;
    }

    pub(super) fn finish_at_end_of_input(&mut self) {
        let len = self.source().len();

        if self.opening {
            self.opening = false;
            self.finish_truncated_opening(len);
        }
        self.flush_text(len);

        while let Some(mut tag) = self.tree.stack.pop() {
            if tag.policy.does_not_require_closing_tag {
                tag.body_end = len;
                tag.end = len;
                self.tree.insert(Built::Tag(tag));
            } else {
                self.tree.degrade(&tag, len);
            }
        }
        self.parsing_enabled = true;
    }

    /// Input ended inside an opening tag.
    ///
    /// A standalone tag whose name was read to the last character needs nothing more
    /// and is kept; any other tag becomes text.
    fn finish_truncated_opening(&mut self, len: usize) {
        let source = self.source();
        let in_name = G::kind(self.state) == StateKind::TagName;
        let Some(tag) = self.tree.stack.last_mut() else {
            return;
        };
        let name = source.get(tag.begin + 1..len).unwrap_or_default();
        let policy = self.tree.policies.attributes(name);
        if in_name && policy.standalone {
            tag.name_end = len;
            tag.body_begin = len;
            tag.body_end = len;
            tag.end = len;
            tag.policy = policy;
            if let Some(tag) = self.tree.stack.pop() {
                self.tree.insert(Built::Tag(tag));
            }
        } else {
            self.abandon_opening_tag("input ends inside an opening tag");
        }
    }
}
