//! Per-tag output templates.
//!
//! A template is literal output with placeholders:
//!
//! | Placeholder  | Expands to                                  |
//! |--------------|---------------------------------------------|
//! | `{body}`     | the rendered children of the tag            |
//! | `{name}`     | the tag name as written in the source       |
//! | `{value}`    | the `[tag=value]` value                     |
//! | `{attr:KEY}` | the named attribute `KEY`                   |
//!
//! `{{` and `}}` produce literal braces. Templates are checked when parsed, so a
//! renderer never meets an unknown placeholder.
use std::{fmt, str::FromStr};

use rustc_hash::FxHashMap;

use crate::Error;

/// One piece of a parsed [`Template`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// Output written as is.
    Literal(String),
    /// `{body}`
    Body,
    /// `{name}`
    Name,
    /// `{value}`
    Value,
    /// `{attr:KEY}`
    Attribute(String),
}

/// A parsed template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateSyntax`] for an unknown, empty or unclosed placeholder
    /// and for a lone `}`.
    pub fn parse(source: &str) -> Result<Self, Error> {
        let syntax = |reason: String| Error::TemplateSyntax {
            template: source.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(syntax("unmatched `}`".to_string())),
                '{' => {
                    let mut placeholder = String::new();
                    let mut closed = false;
                    for ch in chars.by_ref() {
                        if ch == '}' {
                            closed = true;
                            break;
                        }
                        placeholder.push(ch);
                    }
                    if !closed {
                        return Err(syntax(format!("unclosed placeholder `{{{placeholder}`")));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(placeholder_segment(&placeholder).map_err(syntax)?);
                }
                _ => literal.push(ch),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The string this template was parsed from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed pieces, in output order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the template renders the tag's children at all.
    #[must_use]
    pub fn has_body(&self) -> bool {
        self.segments.contains(&Segment::Body)
    }
}

fn placeholder_segment(placeholder: &str) -> Result<Segment, String> {
    match placeholder.trim() {
        "body" => Ok(Segment::Body),
        "name" => Ok(Segment::Name),
        "value" => Ok(Segment::Value),
        other => match other.strip_prefix("attr:").map(str::trim) {
            Some("") => Err("empty attribute name in `{attr:}`".to_string()),
            Some(key) => Ok(Segment::Attribute(key.to_string())),
            None => Err(format!("unknown placeholder `{other}`")),
        },
    }
}

impl FromStr for Template {
    type Err = Error;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::parse(source)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Templates keyed by tag name, looked up case-insensitively.
#[derive(Clone, Debug, Default)]
pub struct Templates(FxHashMap<String, Template>);

impl Templates {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `template` for `name`, returning the template it replaces.
    pub fn insert(&mut self, name: &str, template: Template) -> Option<Template> {
        self.0.insert(name.to_lowercase(), template)
    }

    /// Parse `source` and register it for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateSyntax`] if `source` is not a valid template; the
    /// registry is left unchanged.
    pub fn insert_str(&mut self, name: &str, source: &str) -> Result<(), Error> {
        let template = Template::parse(source)?;
        self.insert(name, template);
        Ok(())
    }

    /// The template registered for `name`, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.0.get(&name.to_lowercase())
    }

    /// Number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no template is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build a registry from `(name, template source)` pairs.
    ///
    /// # Errors
    ///
    /// Returns the first [`Error::TemplateSyntax`] met.
    pub fn from_sources<'a, I>(sources: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut templates = Self::new();
        for (name, source) in sources {
            templates.insert_str(name, source)?;
        }
        Ok(templates)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_segments() -> Result<(), Error> {
        let template = Template::parse("<a href=\"{attr:href}\" title=\"{value}\">{body}</a>")?;
        assert_eq!(
            template.segments(),
            &[
                Segment::Literal("<a href=\"".to_string()),
                Segment::Attribute("href".to_string()),
                Segment::Literal("\" title=\"".to_string()),
                Segment::Value,
                Segment::Literal("\">".to_string()),
                Segment::Body,
                Segment::Literal("</a>".to_string()),
            ]
        );
        assert!(template.has_body());
        Ok(())
    }

    #[test]
    fn test_escaped_braces() -> Result<(), Error> {
        let template: Template = "{{{name}}}".parse()?;
        assert_eq!(
            template.segments(),
            &[
                Segment::Literal("{".to_string()),
                Segment::Name,
                Segment::Literal("}".to_string()),
            ]
        );
        assert!(!template.has_body());
        assert_eq!(template.to_string(), "{{{name}}}");
        Ok(())
    }

    #[test]
    fn test_empty_template() -> Result<(), Error> {
        assert!(Template::parse("")?.segments().is_empty());
        Ok(())
    }

    #[rstest::rstest]
    #[case::unknown("<b>{bdy}</b>", "unknown placeholder `bdy`")]
    #[case::unclosed("<b>{body</b>", "unclosed placeholder `{body</b>`")]
    #[case::unmatched("a } b", "unmatched `}`")]
    #[case::empty_attribute("{attr:}", "empty attribute name in `{attr:}`")]
    fn test_syntax_errors(#[case] source: &str, #[case] expected: &str) {
        let Err(Error::TemplateSyntax { template, reason }) = Template::parse(source) else {
            panic!("expected a syntax error for {source:?}");
        };
        assert_eq!(template, source);
        assert_eq!(reason, expected);
    }

    #[test]
    fn test_registry_ignores_case() -> Result<(), Error> {
        let mut templates = Templates::new();
        templates.insert_str("B", "<strong>{body}</strong>")?;
        assert!(templates.get("b").is_some());
        assert!(templates.get("i").is_none());
        assert_eq!(templates.len(), 1);
        assert!(templates.insert_str("i", "{oops}").is_err());
        assert_eq!(templates.len(), 1);
        Ok(())
    }
}
