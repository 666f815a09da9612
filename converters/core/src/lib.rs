//! Core traits and utilities for tagmark converters.
//!
//! This crate consumes the [`Document`](tagmark_parser::Document) built by
//! `tagmark-parser` and never influences parsing:
//!
//! - [`Visitor`](visitor::Visitor) - visitor pattern for tree traversal
//! - [`Renderer`] - expands a [`Template`] per tag name into output
//! - [`PlainText`] - the text of a document with every tag stripped
//! - [`Options`] - configuration for conversion
//!
//! # Example
//!
//! ```
//! use tagmark_converters_core::{Options, Templates, render_to_string};
//! use tagmark_parser::{TagPolicies, parse_bracket};
//!
//! let templates = Templates::from_sources([
//!     ("b", "<strong>{body}</strong>"),
//!     ("url", "<a href=\"{value}\">{body}</a>"),
//! ])?;
//! let document = parse_bracket("[b]hi[/b] [url=/x]there[/url]", &TagPolicies::new());
//! let html = render_to_string(&document, &templates, &Options::default())?;
//! assert_eq!(html, "<strong>hi</strong> <a href=\"/x\">there</a>");
//! # Ok::<(), tagmark_converters_core::Error>(())
//! ```

mod error;
pub mod escape;
mod render;
mod template;
mod text;
pub mod visitor;

pub use error::Error;
pub use render::{Renderer, render_to_string};
pub use template::{Segment, Template, Templates};
pub use text::{PlainText, extract_text};

/// Line break written for `\n` inside tags whose policy transforms new lines.
pub const DEFAULT_LINE_BREAK: &str = "<br>";

/// Converter options.
///
/// Use [`Options::builder()`] to construct an instance. This struct is marked
/// `#[non_exhaustive]` to allow adding new fields in future minor versions.
///
/// # Example
///
/// ```
/// use tagmark_converters_core::Options;
///
/// let options = Options::builder()
///     .strict(true)
///     .escape_html(false)
///     .build();
/// assert!(options.strict());
/// assert_eq!(options.line_break(), "<br>");
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Options {
    strict: bool,
    escape_html: bool,
    line_break: String,
}

impl Default for Options {
    fn default() -> Self {
        OptionsBuilder::default().build()
    }
}

impl Options {
    /// Create a new builder with default values.
    #[must_use]
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }

    /// Get whether a tag without a template (or a template placeholder without data)
    /// is an error.
    ///
    /// When false, unknown tags keep their original markup around their rendered body
    /// and missing values expand to nothing.
    #[must_use]
    pub fn strict(&self) -> bool {
        self.strict
    }

    /// Get whether text, values and attributes are HTML-escaped on output.
    #[must_use]
    pub fn escape_html(&self) -> bool {
        self.escape_html
    }

    /// Get the string written in place of `\n` inside new-line transforming tags.
    #[must_use]
    pub fn line_break(&self) -> &str {
        &self.line_break
    }
}

/// Builder for [`Options`].
///
/// Use [`Options::builder()`] to create a new builder.
#[derive(Debug, Clone)]
pub struct OptionsBuilder {
    strict: bool,
    escape_html: bool,
    line_break: String,
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        Self {
            strict: false,
            escape_html: true,
            line_break: DEFAULT_LINE_BREAK.to_string(),
        }
    }
}

impl OptionsBuilder {
    /// Enable or disable strict rendering.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Enable or disable HTML escaping of text, values and attributes.
    #[must_use]
    pub fn escape_html(mut self, escape_html: bool) -> Self {
        self.escape_html = escape_html;
        self
    }

    /// Set the string written in place of `\n` inside new-line transforming tags.
    #[must_use]
    pub fn line_break<S: AsRef<str>>(mut self, line_break: S) -> Self {
        self.line_break = line_break.as_ref().to_string();
        self
    }

    /// Build the [`Options`] instance.
    #[must_use]
    pub fn build(self) -> Options {
        Options {
            strict: self.strict,
            escape_html: self.escape_html,
            line_break: self.line_break,
        }
    }
}
