/// Errors raised while rendering a document.
///
/// Parsing never produces these: a [`Document`](tagmark_parser::Document) is always
/// well-formed by the time it reaches a converter.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Strict rendering met a tag with no registered template.
    #[error("no template registered for tag '{0}'")]
    MissingTemplate(String),

    /// A template string could not be parsed.
    #[error("invalid template {template:?}: {reason}")]
    TemplateSyntax {
        /// The offending template source.
        template: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A template referenced data the tag does not have.
    #[error("cannot expand template for tag '{tag}': {reason}")]
    TemplateExecution {
        /// Name of the tag being rendered.
        tag: String,
        /// What was missing.
        reason: String,
    },

    /// Writing to a [`std::fmt::Write`] sink failed.
    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),

    /// Writing to a [`std::io::Write`] sink failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get advice for this error if available.
    #[must_use]
    pub fn advice(&self) -> Option<&'static str> {
        match self {
            Self::MissingTemplate(_) => Some(
                "register a template for this tag, or disable strict mode to pass unknown tags through",
            ),
            Self::TemplateSyntax { .. } => Some(
                "placeholders are {body}, {name}, {value} and {attr:KEY}; write {{ and }} for literal braces",
            ),
            Self::TemplateExecution { .. } => {
                Some("disable strict mode to expand missing values as empty text")
            }
            Self::Fmt(_) | Self::Io(_) => None,
        }
    }
}
