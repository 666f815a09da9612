use serde::Serialize;

/// A half-open byte range into the source buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub begin: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.begin)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.begin
    }
}

/// Handle to a node stored in a [`Document`](crate::Document).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A named attribute of a tag: `key="value"` or a bare `key`.
///
/// Both spans point into the source; the value span is already trimmed and excludes
/// any quotes. A bare attribute has an empty value span at the end of its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Attribute {
    pub name: Span,
    pub value: Span,
}

/// A node of the tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Node {
    Tag(TagNode),
    Text(TextNode),
}

impl Node {
    #[must_use]
    pub fn begin(&self) -> usize {
        match self {
            Self::Tag(tag) => tag.begin,
            Self::Text(text) => text.begin,
        }
    }

    #[must_use]
    pub fn end(&self) -> usize {
        match self {
            Self::Tag(tag) => tag.end,
            Self::Text(text) => text.end,
        }
    }

    #[must_use]
    pub fn span(&self) -> Span {
        Span::new(self.begin(), self.end())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.span().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.span().is_empty()
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        match self {
            Self::Tag(tag) => tag.parent,
            Self::Text(text) => text.parent,
        }
    }

    #[must_use]
    pub fn as_tag(&self) -> Option<&TagNode> {
        match self {
            Self::Tag(tag) => Some(tag),
            Self::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Self::Text(text) => Some(text),
            Self::Tag(_) => None,
        }
    }

    #[must_use]
    pub fn is_tag(&self) -> bool {
        matches!(self, Self::Tag(_))
    }

    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        match self {
            Self::Tag(tag) => tag.parent = parent,
            Self::Text(text) => text.parent = parent,
        }
    }
}

/// A structural tag.
///
/// Offsets satisfy `begin <= name_end <= body_begin <= body_end <= end`. The tag name
/// starts right after the one-byte opening delimiter. Without a body
/// `body_begin == body_end`; without a closing tag `body_end == end`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TagNode {
    pub begin: usize,
    pub name_end: usize,
    pub body_begin: usize,
    pub body_end: usize,
    pub end: usize,
    pub(crate) value: Option<Span>,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
}

impl TagNode {
    #[must_use]
    pub fn name_span(&self) -> Span {
        Span::new((self.begin + 1).min(self.name_end), self.name_end)
    }

    #[must_use]
    pub fn body_span(&self) -> Span {
        Span::new(self.body_begin, self.body_end)
    }

    /// The `[tag=value]` value, trimmed and unquoted.
    #[must_use]
    pub fn value_span(&self) -> Option<Span> {
        self.value
    }

    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn has_body(&self) -> bool {
        self.body_end > self.body_begin
    }

    #[must_use]
    pub fn has_closing_tag(&self) -> bool {
        self.end > self.body_end
    }
}

/// A contiguous run of literal content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextNode {
    pub begin: usize,
    pub end: usize,
    pub(crate) parent: Option<NodeId>,
}

impl TextNode {
    #[must_use]
    pub fn span(&self) -> Span {
        Span::new(self.begin, self.end)
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}
