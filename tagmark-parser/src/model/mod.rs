//! The tree produced by a parse: a [`Document`] owning its source buffer and an
//! arena of [`Node`]s addressed by [`NodeId`].
mod document;
mod node;

pub use document::Document;
pub use node::{Attribute, Node, NodeId, Span, TagNode, TextNode};
