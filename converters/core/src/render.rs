//! Template rendering.
//!
//! [`Renderer`] walks a document and expands, for each tag, the [`Template`]
//! registered under its name. Text is written through, HTML-escaped unless disabled.
//! Inside a tag whose policy transforms new lines, every `\n` in the text becomes
//! [`Options::line_break`].
use std::{borrow::Cow, io::Write};

use tagmark_parser::{Document, NodeId, TagNode, TagPolicies};
use tracing::instrument;

use crate::{
    Error, Options,
    escape::escape_html,
    template::{Segment, Template, Templates},
    visitor::{Visitor, WritableVisitor, WritableVisitorExt},
};

/// Renders documents into `W` from a registry of templates.
pub struct Renderer<'t, W: Write> {
    writer: W,
    templates: &'t Templates,
    policies: Option<&'t TagPolicies>,
    options: Options,
    /// Number of open new-line transforming tags around the current node.
    newline_depth: usize,
}

impl<'t, W: Write> Renderer<'t, W> {
    /// Create a renderer writing to `writer`.
    #[must_use]
    pub fn new(writer: W, templates: &'t Templates, options: Options) -> Self {
        Self {
            writer,
            templates,
            policies: None,
            options,
            newline_depth: 0,
        }
    }

    /// Consult `policies` for which tags transform new lines.
    ///
    /// Usually the same policies the document was parsed with.
    #[must_use]
    pub fn with_policies(mut self, policies: &'t TagPolicies) -> Self {
        self.policies = Some(policies);
        self
    }

    /// Render `document` into the writer.
    ///
    /// # Errors
    ///
    /// Fails on a write error and, in strict mode, on a tag without a template or a
    /// placeholder the tag has no data for.
    #[instrument(skip_all, fields(len = document.len(), strict = self.options.strict()))]
    pub fn render(&mut self, document: &Document) -> Result<(), Error> {
        self.visit_document(document)
    }

    /// Recover the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn transforms_new_lines(&self, name: &str) -> bool {
        self.policies
            .is_some_and(|policies| policies.transforms_new_lines(name))
    }

    fn escaped<'s>(&self, text: &'s str) -> Cow<'s, str> {
        if self.options.escape_html() {
            escape_html(text)
        } else {
            Cow::Borrowed(text)
        }
    }

    fn write_escaped(&mut self, text: &str) -> Result<(), Error> {
        let escaped = self.escaped(text);
        self.writer.write_all(escaped.as_bytes())?;
        Ok(())
    }

    /// Write a placeholder's data, or handle its absence per the strict option.
    fn write_data(&mut self, name: &str, data: Option<&str>, what: &str) -> Result<(), Error> {
        match data {
            Some(data) => self.write_escaped(data),
            None if self.options.strict() => Err(Error::TemplateExecution {
                tag: name.to_string(),
                reason: format!("tag has no {what}"),
            }),
            None => {
                tracing::debug!(tag = name, what, "expanding missing data as empty");
                Ok(())
            }
        }
    }

    fn expand(
        &mut self,
        document: &Document,
        id: NodeId,
        tag: &TagNode,
        template: &Template,
    ) -> Result<(), Error> {
        let name = document.tag_name(id).unwrap_or_default();
        for segment in template.segments() {
            match segment {
                Segment::Literal(literal) => self.writer.write_all(literal.as_bytes())?,
                Segment::Body => self.visit_children(document, tag.children())?,
                Segment::Name => self.write_escaped(name)?,
                Segment::Value => self.write_data(name, document.value(id), "value")?,
                Segment::Attribute(key) => {
                    self.write_data(name, document.attribute(id, key), &format!("attribute `{key}`"))?;
                }
            }
        }
        Ok(())
    }

    /// Keep the tag's own markup around its rendered body.
    fn pass_through(&mut self, document: &Document, tag: &TagNode) -> Result<(), Error> {
        let opening = document.string(tag.begin, tag.body_begin).unwrap_or_default();
        let closing = document.string(tag.body_end, tag.end).unwrap_or_default();
        let opening = self.escaped(opening).into_owned();
        let closing = self.escaped(closing).into_owned();
        self.render_wrapped(document, tag.children(), &opening, &closing)
    }
}

impl<W: Write> Visitor for Renderer<'_, W> {
    type Error = Error;

    fn visit_tag(&mut self, document: &Document, id: NodeId, tag: &TagNode) -> Result<(), Error> {
        let name = document.tag_name(id).unwrap_or_default();
        let transforms = self.transforms_new_lines(name);
        if transforms {
            self.newline_depth += 1;
        }

        let templates = self.templates;
        let result = match templates.get(name) {
            Some(template) => self.expand(document, id, tag, template),
            None if self.options.strict() => Err(Error::MissingTemplate(name.to_string())),
            None => {
                tracing::warn!(tag = name, begin = tag.begin, "no template registered, keeping markup");
                self.pass_through(document, tag)
            }
        };

        if transforms {
            self.newline_depth -= 1;
        }
        result
    }

    fn visit_text(&mut self, _document: &Document, _id: NodeId, text: &str) -> Result<(), Error> {
        if self.newline_depth == 0 {
            return self.write_escaped(text);
        }
        let escaped = self.escaped(text);
        let mut lines = escaped.split('\n');
        if let Some(first) = lines.next() {
            self.writer.write_all(first.as_bytes())?;
        }
        for line in lines {
            self.writer.write_all(self.options.line_break().as_bytes())?;
            self.writer.write_all(line.as_bytes())?;
        }
        Ok(())
    }
}

impl<W: Write> WritableVisitor for Renderer<'_, W> {
    fn writer_mut(&mut self) -> &mut dyn Write {
        &mut self.writer
    }
}

/// Render `document` with `templates` into a new string.
///
/// # Errors
///
/// See [`Renderer::render`].
pub fn render_to_string(
    document: &Document,
    templates: &Templates,
    options: &Options,
) -> Result<String, Error> {
    let mut renderer = Renderer::new(Vec::new(), templates, options.clone());
    renderer.render(document)?;
    let bytes = renderer.into_inner();
    // only `&str` data is ever written
    Ok(String::from_utf8(bytes)
        .unwrap_or_else(|error| String::from_utf8_lossy(error.as_bytes()).into_owned()))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use pretty_assertions::assert_eq;
    use tagmark_parser::{TagAttributes, parse_angle, parse_bracket};

    use super::*;

    fn templates() -> Templates {
        Templates::from_sources([
            ("b", "<strong>{body}</strong>"),
            ("i", "<em>{body}</em>"),
            ("url", "<a href=\"{value}\">{body}</a>"),
            ("img", "<img src=\"{attr:src}\" alt=\"{attr:alt}\">"),
            ("code", "<pre>{body}</pre>"),
            ("list", "<ul>{body}</ul>"),
            ("*", "<li>{body}</li>"),
            ("hr", "<hr>"),
            ("quote", "<blockquote data-tag=\"{name}\">{body}</blockquote>"),
        ])
        .unwrap_or_default()
    }

    fn render(source: &str, options: &Options) -> Result<String, Error> {
        let document = parse_bracket(source, &TagPolicies::new());
        render_to_string(&document, &templates(), options)
    }

    #[rstest::rstest]
    #[case::plain("just text", "just text")]
    #[case::nested("[b]a[i]b[/i][/b]", "<strong>a<em>b</em></strong>")]
    #[case::value("[url=/x?a=1&b=2]go[/url]", "<a href=\"/x?a=1&amp;b=2\">go</a>")]
    #[case::attributes("[img src=a.png alt='a b'][/img]", "<img src=\"a.png\" alt=\"a b\">")]
    #[case::pre_formatted("[code][b]<x>[/b][/code]", "<pre>[b]&lt;x&gt;[/b]</pre>")]
    #[case::implicit_close("[list][*]a[*]b[/list]", "<ul><li>a</li><li>b</li></ul>")]
    #[case::standalone("a[hr]b", "a<hr>b")]
    #[case::name_as_written("[QUOTE]x[/quote]", "<blockquote data-tag=\"QUOTE\">x</blockquote>")]
    #[case::degraded_tag_is_text("[b]x<[/i]", "[b]x&lt;[/i]")]
    fn test_renders(#[case] source: &str, #[case] expected: &str) -> Result<(), Error> {
        assert_eq!(render(source, &Options::default())?, expected);
        Ok(())
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_lenient_keeps_unknown_markup() -> Result<(), Error> {
        let output = render("[spoiler=\"a\"]x [b]y[/b][/spoiler]", &Options::default())?;
        assert_eq!(
            output,
            "[spoiler=&quot;a&quot;]x <strong>y</strong>[/spoiler]"
        );
        assert!(logs_contain("no template registered, keeping markup"));
        Ok(())
    }

    #[test]
    fn test_lenient_missing_value_is_empty() -> Result<(), Error> {
        assert_eq!(
            render("[url]x[/url]", &Options::default())?,
            "<a href=\"\">x</a>"
        );
        Ok(())
    }

    #[test]
    fn test_strict_missing_template() {
        let options = Options::builder().strict(true).build();
        let Err(Error::MissingTemplate(name)) = render("a [Spoiler]x[/Spoiler]", &options) else {
            panic!("expected a missing template error");
        };
        assert_eq!(name, "Spoiler");
    }

    #[test]
    fn test_strict_missing_attribute() {
        let options = Options::builder().strict(true).build();
        let Err(Error::TemplateExecution { tag, reason }) = render("[img src=a.png][/img]", &options)
        else {
            panic!("expected a template execution error");
        };
        assert_eq!(tag, "img");
        assert_eq!(reason, "tag has no attribute `alt`");
    }

    #[test]
    fn test_without_escaping() -> Result<(), Error> {
        let options = Options::builder().escape_html(false).build();
        assert_eq!(render("a < [b]&[/b]", &options)?, "a < <strong>&</strong>");
        Ok(())
    }

    #[test]
    fn test_transforms_new_lines_inside_policy_tags() -> Result<(), Error> {
        let policies: TagPolicies = [("quote", TagAttributes::new().transform_new_lines())]
            .into_iter()
            .collect();
        let source = "a\nb[quote]c\n[b]d\ne[/b][/quote]";
        let document = parse_bracket(source, &policies);
        let templates = templates();
        let mut renderer = Renderer::new(Vec::new(), &templates, Options::default())
            .with_policies(&policies);
        renderer.render(&document)?;
        let output = String::from_utf8_lossy(&renderer.into_inner()).into_owned();
        assert_eq!(
            output,
            "a\nb<blockquote data-tag=\"quote\">c<br><strong>d<br>e</strong></blockquote>"
        );
        Ok(())
    }

    #[test]
    fn test_angle_document() -> Result<(), Error> {
        let templates = Templates::from_sources([("p", "<p>{body}</p>"), ("br", "<br/>")])?;
        let document = parse_angle("<p>a<br>b</p>", &TagPolicies::new());
        assert_eq!(
            render_to_string(&document, &templates, &Options::default())?,
            "<p>a<br/>b</p>"
        );
        Ok(())
    }
}
