use serde::{
    Serialize,
    ser::{SerializeMap, SerializeSeq, Serializer},
};

use super::node::{Node, NodeId, Span, TagNode, TextNode};
use crate::OffsetLedger;

/// The result of a parse: the source buffer plus the tree built over it.
///
/// Nodes live in an arena and refer to each other through [`NodeId`] handles. Every
/// offset in the tree indexes into [`Document::source`]; no node copies content.
/// A document is read-only once returned, so it can be traversed from several places
/// at once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    source: String,
    nodes: Vec<Node>,
    children: Vec<NodeId>,
    offsets: OffsetLedger,
    attribute_offsets: OffsetLedger,
}

impl Document {
    pub(crate) fn new(
        source: String,
        offsets: OffsetLedger,
        attribute_offsets: OffsetLedger,
    ) -> Self {
        Self {
            source,
            nodes: Vec::new(),
            children: Vec::new(),
            offsets,
            attribute_offsets,
        }
    }

    /// Append `node` to the arena as the last child of `parent` (or of the document).
    pub(crate) fn push_node(&mut self, mut node: Node, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.set_parent(parent);
        self.nodes.push(node);
        match parent.and_then(|parent| self.nodes.get_mut(parent.0)) {
            Some(Node::Tag(tag)) => tag.children.push(id),
            Some(Node::Text(_)) | None => self.children.push(id),
        }
        id
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.source.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Top-level nodes, in document order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&TagNode> {
        self.node(id).and_then(Node::as_tag)
    }

    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&TextNode> {
        self.node(id).and_then(Node::as_text)
    }

    /// Children of a tag, or an empty slice for text nodes.
    #[must_use]
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.tag(id).map_or(&[][..], TagNode::children)
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    /// Slice of the source buffer, `None` when out of range or not on a char boundary.
    #[must_use]
    pub fn string(&self, begin: usize, end: usize) -> Option<&str> {
        self.source.get(begin..end)
    }

    #[must_use]
    pub fn span_str(&self, span: Span) -> &str {
        self.string(span.begin, span.end).unwrap_or_default()
    }

    /// The exact source text covered by a node, markup included.
    #[must_use]
    pub fn raw_string(&self, id: NodeId) -> &str {
        self.node(id)
            .map_or("", |node| self.span_str(node.span()))
    }

    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.tag(id).map(|tag| self.span_str(tag.name_span()))
    }

    #[must_use]
    pub fn body(&self, id: NodeId) -> Option<&str> {
        self.tag(id).map(|tag| self.span_str(tag.body_span()))
    }

    /// The `[tag=value]` value of a tag.
    #[must_use]
    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.tag(id)
            .and_then(TagNode::value_span)
            .map(|span| self.span_str(span))
    }

    /// Look up a named attribute; keys compare case-insensitively.
    #[must_use]
    pub fn attribute(&self, id: NodeId, key: &str) -> Option<&str> {
        self.tag(id)?
            .attributes()
            .iter()
            .find(|attribute| self.span_str(attribute.name).eq_ignore_ascii_case(key))
            .map(|attribute| self.span_str(attribute.value))
    }

    /// Named attributes of a tag, in source order.
    pub fn attributes(&self, id: NodeId) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.tag(id)
            .map_or(&[][..], TagNode::attributes)
            .iter()
            .map(|attribute| (self.span_str(attribute.name), self.span_str(attribute.value)))
    }

    /// Name of the closest enclosing tag.
    #[must_use]
    pub fn parent_tag_name(&self, id: NodeId) -> Option<&str> {
        self.parent(id).and_then(|parent| self.tag_name(parent))
    }

    /// Markup spans removed by a markup-free rendering, keyed by source position.
    #[must_use]
    pub fn offsets(&self) -> &OffsetLedger {
        &self.offsets
    }

    /// Syntax consumed around attribute values, keyed by the trimmed value start.
    #[must_use]
    pub fn attribute_offsets(&self) -> &OffsetLedger {
        &self.attribute_offsets
    }

    /// Visit every node depth-first, in document order.
    pub fn walk<F>(&self, mut callback: F)
    where
        F: FnMut(NodeId, &Node),
    {
        let mut pending: Vec<NodeId> = self.children.iter().rev().copied().collect();
        while let Some(id) = pending.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            callback(id, node);
            if let Node::Tag(tag) = node {
                pending.extend(tag.children.iter().rev().copied());
            }
        }
    }

    /// Visit every tag depth-first, in document order.
    pub fn walk_tags<F>(&self, mut callback: F)
    where
        F: FnMut(NodeId, &TagNode),
    {
        self.walk(|id, node| {
            if let Node::Tag(tag) = node {
                callback(id, tag);
            }
        });
    }
}

struct NodeTree<'a> {
    document: &'a Document,
    ids: &'a [NodeId],
}

impl Serialize for NodeTree<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.ids.len()))?;
        for &id in self.ids {
            seq.serialize_element(&NodeEntry {
                document: self.document,
                id,
            })?;
        }
        seq.end()
    }
}

struct NodeEntry<'a> {
    document: &'a Document,
    id: NodeId,
}

impl Serialize for NodeEntry<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_map(None)?;
        match self.document.node(self.id) {
            Some(Node::Tag(tag)) => {
                state.serialize_entry("type", "tag")?;
                state.serialize_entry("name", self.document.span_str(tag.name_span()))?;
                state.serialize_entry("begin", &tag.begin)?;
                state.serialize_entry("nameEnd", &tag.name_end)?;
                state.serialize_entry("bodyBegin", &tag.body_begin)?;
                state.serialize_entry("bodyEnd", &tag.body_end)?;
                state.serialize_entry("end", &tag.end)?;
                if let Some(value) = tag.value {
                    state.serialize_entry("value", self.document.span_str(value))?;
                }
                if !tag.attributes.is_empty() {
                    let attributes: Vec<(&str, &str)> = self.document.attributes(self.id).collect();
                    state.serialize_entry("attributes", &attributes)?;
                }
                state.serialize_entry(
                    "children",
                    &NodeTree {
                        document: self.document,
                        ids: &tag.children,
                    },
                )?;
            }
            Some(Node::Text(text)) => {
                state.serialize_entry("type", "text")?;
                state.serialize_entry("begin", &text.begin)?;
                state.serialize_entry("end", &text.end)?;
            }
            None => {}
        }
        state.end()
    }
}

// Documents serialize as a tree so they can be inspected or compared as JSON.
impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_map(Some(2))?;
        state.serialize_entry("type", "document")?;
        state.serialize_entry(
            "children",
            &NodeTree {
                document: self,
                ids: &self.children,
            },
        )?;
        state.end()
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> Document {
        // "a[b]c[/b]"
        let mut document = Document::new(
            "a[b]c[/b]".to_string(),
            OffsetLedger::new(),
            OffsetLedger::new(),
        );
        document.push_node(
            Node::Text(TextNode {
                begin: 0,
                end: 1,
                parent: None,
            }),
            None,
        );
        let tag = document.push_node(
            Node::Tag(TagNode {
                begin: 1,
                name_end: 3,
                body_begin: 4,
                body_end: 5,
                end: 9,
                value: None,
                attributes: Vec::new(),
                children: Vec::new(),
                parent: None,
            }),
            None,
        );
        document.push_node(
            Node::Text(TextNode {
                begin: 4,
                end: 5,
                parent: None,
            }),
            Some(tag),
        );
        document
    }

    #[test]
    fn push_node_links_parent_and_children() {
        let document = sample();
        assert_eq!(document.children().len(), 2);
        let tag = document.children()[1];
        let child = document.children_of(tag)[0];
        assert_eq!(document.parent(child), Some(tag));
        assert_eq!(document.parent_tag_name(child), Some("b"));
    }

    #[test]
    fn raw_strings_slice_the_source() {
        let document = sample();
        let raw: Vec<&str> = document
            .children()
            .iter()
            .map(|&id| document.raw_string(id))
            .collect();
        assert_eq!(raw, vec!["a", "[b]c[/b]"]);
        assert_eq!(document.string(1, 4), Some("[b]"));
        assert_eq!(document.string(4, 100), None);
    }

    #[test]
    fn walks_are_restartable_and_in_document_order() {
        let document = sample();
        let mut first = Vec::new();
        document.walk(|id, _| first.push(id));
        let mut second = Vec::new();
        document.walk(|id, _| second.push(id));
        assert_eq!(first, vec![NodeId(0), NodeId(1), NodeId(2)]);
        assert_eq!(first, second);

        let mut tags = Vec::new();
        document.walk_tags(|id, _| tags.push(id));
        assert_eq!(tags, vec![NodeId(1)]);
    }

    #[test]
    fn serializes_as_tree() -> Result<(), serde_json::Error> {
        let document = sample();
        let json = serde_json::to_value(&document)?;
        assert_eq!(
            json,
            serde_json::json!({
                "type": "document",
                "children": [
                    {"type": "text", "begin": 0, "end": 1},
                    {
                        "type": "tag", "name": "b", "begin": 1, "nameEnd": 3,
                        "bodyBegin": 4, "bodyEnd": 5, "end": 9,
                        "children": [{"type": "text", "begin": 4, "end": 5}]
                    }
                ]
            })
        );
        Ok(())
    }
}
