//! Plain-text extraction.
use std::fmt::Write;

use tagmark_parser::{Document, NodeId, TagNode};

use crate::{Error, visitor::Visitor};

/// Visitor writing the text of a document with every tag stripped.
///
/// Tags contribute their children only, so pre-formatted bodies and text that
/// recovery kept as literal markup are included verbatim. Positions in the output map
/// back onto the source through [`PlainText::source_index`].
#[derive(Debug, Default)]
pub struct PlainText<W: Write = String> {
    output: W,
}

impl<W: Write> PlainText<W> {
    /// Create a visitor writing to `output`.
    #[must_use]
    pub fn new(output: W) -> Self {
        Self { output }
    }

    /// Recover the output.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.output
    }

    /// The source index of the character at `output_index` in the extracted text.
    ///
    /// Only indices into the text extracted from `document` are meaningful.
    #[must_use]
    pub fn source_index(document: &Document, output_index: usize) -> usize {
        document.offsets().map_to_source(output_index)
    }
}

impl<W: Write> Visitor for PlainText<W> {
    type Error = Error;

    fn visit_tag(&mut self, document: &Document, _id: NodeId, tag: &TagNode) -> Result<(), Error> {
        self.visit_children(document, tag.children())
    }

    fn visit_text(&mut self, _document: &Document, _id: NodeId, text: &str) -> Result<(), Error> {
        self.output.write_str(text)?;
        Ok(())
    }
}

/// The text of `document` with every tag stripped.
#[must_use]
pub fn extract_text(document: &Document) -> String {
    let mut visitor = PlainText::new(String::with_capacity(document.len()));
    match visitor.visit_document(document) {
        Ok(()) => visitor.into_inner(),
        Err(error) => {
            tracing::error!(%error, "plain text extraction failed");
            String::new()
        }
    }
}
