//! Visitor pattern for traversing a parsed [`Document`].
//!
//! Converters implement [`Visitor`] to decide what each tag and text node turns into.
//! The default methods walk the tree depth-first in document order, so a simple
//! converter only implements [`Visitor::visit_tag`] and [`Visitor::visit_text`].
//!
//! # Naming Conventions
//!
//! - **`visit_*` functions** orchestrate traversal. They take the document and a node
//!   and call back into the visitor for nested content.
//! - **`render_*` functions** write output for one concern directly to a writer and
//!   do not traverse.
//!
//! A [`Document`] is read-only once parsed, so any number of visitors can walk the same
//! document, one after another or from several threads.
use std::io::Write;

use tagmark_parser::{Document, Node, NodeId, TagNode};

/// Callbacks for each node of a [`Document`].
///
/// # Document Structure
///
/// The `visit_document` method calls visitors in this order:
///
/// 1. `visit_document_start()` - document setup
/// 2. Walk the top-level children with `visit_node()`
/// 3. `visit_document_end()` - document cleanup
///
/// Tags are not descended into automatically: `visit_tag` decides whether and where
/// its children are visited, usually through `visit_children`.
pub trait Visitor {
    /// The error type that can be returned during visiting
    type Error;

    /// Called before any node is visited.
    ///
    /// # Errors
    ///
    /// The default implementation never returns an error, but custom implementations
    /// may return errors during document processing.
    fn visit_document_start(&mut self, _document: &Document) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called after every node has been visited.
    ///
    /// # Errors
    ///
    /// The default implementation never returns an error, but custom implementations
    /// may return errors during document processing.
    fn visit_document_end(&mut self, _document: &Document) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Visit a whole document.
    ///
    /// # Errors
    ///
    /// Returns an error if any visitor method fails during document traversal.
    fn visit_document(&mut self, document: &Document) -> Result<(), Self::Error> {
        self.visit_document_start(document)?;
        self.visit_children(document, document.children())?;
        self.visit_document_end(document)
    }

    /// Visit `ids` in order.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a child.
    fn visit_children(&mut self, document: &Document, ids: &[NodeId]) -> Result<(), Self::Error> {
        for &id in ids {
            self.visit_node(document, id)?;
        }
        Ok(())
    }

    /// Dispatch to `visit_tag` or `visit_text`. Unknown ids are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the dispatched visitor fails.
    fn visit_node(&mut self, document: &Document, id: NodeId) -> Result<(), Self::Error> {
        match document.node(id) {
            Some(Node::Tag(tag)) => self.visit_tag(document, id, tag),
            Some(Node::Text(text)) => self.visit_text(document, id, document.span_str(text.span())),
            None => Ok(()),
        }
    }

    /// Visit a tag node.
    ///
    /// # Errors
    ///
    /// Returns an error if conversion of this tag fails.
    fn visit_tag(&mut self, document: &Document, id: NodeId, tag: &TagNode)
    -> Result<(), Self::Error>;

    /// Visit a run of text, passed as the source slice it covers.
    ///
    /// # Errors
    ///
    /// Returns an error if conversion of this text fails.
    fn visit_text(&mut self, document: &Document, id: NodeId, text: &str)
    -> Result<(), Self::Error>;
}

/// A writable visitor that outputs to a writer.
pub trait WritableVisitor: Visitor {
    /// Get a mutable reference to the writer
    fn writer_mut(&mut self) -> &mut dyn Write;
}

/// Rendering helpers shared by every [`WritableVisitor`].
pub trait WritableVisitorExt: WritableVisitor {
    /// Write `prefix`, visit `children`, then write `suffix`.
    ///
    /// The writer borrow is released while the children are visited, since visiting
    /// needs the whole visitor.
    ///
    /// # Errors
    ///
    /// Returns an error if writing or visiting fails.
    fn render_wrapped(
        &mut self,
        document: &Document,
        children: &[NodeId],
        prefix: &str,
        suffix: &str,
    ) -> Result<(), Self::Error>
    where
        Self::Error: From<std::io::Error>,
    {
        self.writer_mut().write_all(prefix.as_bytes())?;
        self.visit_children(document, children)?;
        self.writer_mut().write_all(suffix.as_bytes())?;
        Ok(())
    }
}

// Blanket implementation for all WritableVisitor types
impl<T: WritableVisitor> WritableVisitorExt for T {}
