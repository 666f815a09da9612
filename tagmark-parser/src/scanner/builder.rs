//! Owned intermediate tree used while scanning.
//!
//! Open tags own their children until they are closed; the finished forest is frozen
//! into the arena of a [`Document`] in a single pass at the end.
use crate::{
    Document, OffsetLedger, TagAttributes, TagPolicies,
    model::{Attribute, Node, NodeId, Span, TagNode, TextNode},
};

#[derive(Debug)]
pub(crate) enum Built {
    Tag(OpenTag),
    Text(Span),
}

impl Built {
    pub(crate) fn end(&self) -> usize {
        match self {
            Self::Tag(tag) => tag.end,
            Self::Text(span) => span.end,
        }
    }
}

/// A tag whose offsets are still being discovered.
#[derive(Debug)]
pub(crate) struct OpenTag {
    pub(crate) begin: usize,
    pub(crate) name_end: usize,
    pub(crate) body_begin: usize,
    pub(crate) body_end: usize,
    pub(crate) end: usize,
    pub(crate) value: Option<Span>,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) children: Vec<Built>,
    pub(crate) policy: TagAttributes,
}

impl OpenTag {
    pub(crate) fn new(begin: usize) -> Self {
        Self {
            begin,
            name_end: begin + 1,
            body_begin: begin,
            body_end: begin,
            end: begin,
            value: None,
            attributes: Vec::new(),
            children: Vec::new(),
            policy: TagAttributes::default(),
        }
    }

    pub(crate) fn name<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.begin + 1..self.name_end).unwrap_or_default()
    }

    /// Record a named attribute; a repeated key replaces the earlier value.
    pub(crate) fn set_attribute(&mut self, source: &str, name: Span, value: Span) {
        let key = source.get(name.begin..name.end).unwrap_or_default();
        let existing = self.attributes.iter_mut().find(|attribute| {
            source
                .get(attribute.name.begin..attribute.name.end)
                .is_some_and(|other| names_match(other, key))
        });
        match existing {
            Some(attribute) => *attribute = Attribute { name, value },
            None => self.attributes.push(Attribute { name, value }),
        }
    }

    /// Replace the children of a pre-formatted tag with its raw body.
    pub(crate) fn collapse_body(&mut self) {
        self.children.clear();
        if self.body_end > self.body_begin {
            self.children
                .push(Built::Text(Span::new(self.body_begin, self.body_end)));
        }
    }
}

impl Drop for OpenTag {
    // Nesting depth is bounded only by the input, so tear the subtree down level by
    // level instead of letting each child drop its own children.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            if let Built::Tag(mut tag) = node {
                pending.append(&mut tag.children);
            }
        }
    }
}

/// Case-insensitive tag name comparison.
pub(crate) fn names_match(left: &str, right: &str) -> bool {
    left.eq_ignore_ascii_case(right) || left.to_lowercase() == right.to_lowercase()
}

/// The stack of open tags plus the finished top-level nodes and both ledgers.
#[derive(Debug)]
pub(crate) struct TreeBuilder<'a> {
    pub(crate) source: &'a str,
    pub(crate) policies: &'a TagPolicies,
    pub(crate) stack: Vec<OpenTag>,
    roots: Vec<Built>,
    pub(crate) offsets: OffsetLedger,
    pub(crate) attribute_offsets: OffsetLedger,
}

impl<'a> TreeBuilder<'a> {
    pub(crate) fn new(source: &'a str, policies: &'a TagPolicies) -> Self {
        Self {
            source,
            policies,
            stack: Vec::new(),
            roots: Vec::new(),
            offsets: OffsetLedger::new(),
            attribute_offsets: OffsetLedger::new(),
        }
    }

    /// Attach a finished node to the innermost open tag, or to the document.
    ///
    /// The receiving tag's body grows to cover the node; an implicit-close tag also
    /// grows its end. Tags record their markup in the offset ledger here.
    pub(crate) fn insert(&mut self, node: Built) {
        if let Built::Tag(tag) = &node {
            self.offsets
                .add(tag.begin, signed(tag.body_begin - tag.begin));
            if tag.end > tag.body_end {
                self.offsets
                    .add(tag.body_end, signed(tag.end - tag.body_end));
            }
        }
        match self.stack.last_mut() {
            Some(parent) => {
                parent.body_end = parent.body_end.max(node.end());
                if parent.policy.does_not_require_closing_tag {
                    parent.end = parent.end.max(parent.body_end);
                }
                parent.children.push(node);
            }
            None => self.roots.push(node),
        }
    }

    pub(crate) fn insert_text(&mut self, begin: usize, end: usize) {
        if begin < end {
            self.insert(Built::Text(Span::new(begin, end)));
        }
    }

    /// Turn an open tag back into literal text covering `tag.begin..end`.
    ///
    /// Anything recorded in the ledgers since the tag began belongs to it and goes too.
    pub(crate) fn degrade(&mut self, tag: &OpenTag, end: usize) {
        tracing::debug!(
            begin = tag.begin,
            end,
            name = tag.name(self.source),
            "degrading tag to text"
        );
        self.offsets.discard_from(tag.begin);
        self.attribute_offsets.discard_from(tag.begin);
        self.insert_text(tag.begin, end);
    }

    pub(crate) fn policy_for(&self, name: &str) -> TagAttributes {
        self.policies.attributes(name)
    }

    pub(crate) fn top_name(&self) -> Option<&'a str> {
        let source = self.source;
        self.stack.last().map(|tag| tag.name(source))
    }

    /// Backfill, merge adjacent text and freeze into an arena document.
    pub(crate) fn finish(mut self) -> Document {
        let len = self.source.len();
        let covered = self.roots.last().map_or(0, Built::end);
        if covered < len {
            self.roots.push(Built::Text(Span::new(covered, len)));
        }
        merge_adjacent_text(&mut self.roots);

        let mut document = Document::new(
            self.source.to_string(),
            self.offsets,
            self.attribute_offsets,
        );
        freeze(&mut document, self.roots);
        document
    }
}

fn signed(amount: usize) -> isize {
    isize::try_from(amount).unwrap_or(isize::MAX)
}

/// Merge touching text siblings at every level of the tree.
pub(crate) fn merge_adjacent_text(nodes: &mut Vec<Built>) {
    let mut pending = vec![nodes];
    while let Some(level) = pending.pop() {
        merge_level(level);
        for node in level {
            if let Built::Tag(tag) = node {
                pending.push(&mut tag.children);
            }
        }
    }
}

fn merge_level(nodes: &mut Vec<Built>) {
    let mut merged: Vec<Built> = Vec::with_capacity(nodes.len());
    for node in nodes.drain(..) {
        if let (Built::Text(next), Some(Built::Text(previous))) = (&node, merged.last_mut())
            && previous.end == next.begin
        {
            previous.end = next.end;
            continue;
        }
        merged.push(node);
    }
    *nodes = merged;
}

/// Move the finished forest into the arena, parents before children.
fn freeze(document: &mut Document, roots: Vec<Built>) {
    let mut pending = vec![(roots.into_iter(), None)];
    while let Some((nodes, parent)) = pending.last_mut() {
        let parent = *parent;
        let Some(node) = nodes.next() else {
            pending.pop();
            continue;
        };
        match node {
            Built::Text(span) => {
                document.push_node(
                    Node::Text(TextNode {
                        begin: span.begin,
                        end: span.end,
                        parent: None,
                    }),
                    parent,
                );
            }
            Built::Tag(mut tag) => {
                let children = std::mem::take(&mut tag.children);
                let id = document.push_node(
                    Node::Tag(TagNode {
                        begin: tag.begin,
                        name_end: tag.name_end,
                        body_begin: tag.body_begin,
                        body_end: tag.body_end,
                        end: tag.end,
                        value: tag.value,
                        attributes: std::mem::take(&mut tag.attributes),
                        children: Vec::new(),
                        parent: None,
                    }),
                    parent,
                );
                pending.push((children.into_iter(), Some(id)));
            }
        }
    }
}
