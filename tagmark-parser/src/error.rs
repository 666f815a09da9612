use std::fmt;

/// Errors surfaced by the parser crate.
///
/// Parsing itself never fails: malformed markup degrades to text. The only fallible
/// operations are the ones that check or load tag policies before a parse.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("incoherent tag attributes: {0}")]
    IncoherentTagAttributes(Conflict),

    #[error("invalid policy for tag '{tag}': {source}")]
    InvalidTagPolicy {
        tag: String,
        #[source]
        source: Box<Error>,
    },

    #[error("could not read tag policies: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// The tag name this error refers to, if any.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::InvalidTagPolicy { tag, .. } => Some(tag),
            Self::IncoherentTagAttributes(_) | Self::Json(_) => None,
        }
    }

    /// Get advice for this error if available.
    #[must_use]
    pub fn advice(&self) -> Option<&'static str> {
        match self {
            Self::IncoherentTagAttributes(conflict) => Some(conflict.advice()),
            Self::InvalidTagPolicy { source, .. } => source.advice(),
            Self::Json(_) => None,
        }
    }
}

/// A combination of tag attribute flags that cannot be honoured together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Conflict {
    /// A pre-formatted body is only terminated by its closing tag.
    PreFormattedWithoutClosingTag,
    /// A standalone tag has no body to pre-format.
    PreFormattedStandalone,
    /// A standalone tag never has a closing tag to omit.
    ImplicitCloseStandalone,
}

impl Conflict {
    fn advice(self) -> &'static str {
        match self {
            Self::PreFormattedWithoutClosingTag => {
                "drop `doesNotRequireClosingTag`: a pre-formatted body ends only at its closing tag"
            }
            Self::PreFormattedStandalone => {
                "choose either `hasPreFormattedBody` or `standalone`, a standalone tag has no body"
            }
            Self::ImplicitCloseStandalone => {
                "choose either `doesNotRequireClosingTag` or `standalone`, they describe different tags"
            }
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreFormattedWithoutClosingTag => {
                write!(f, "a pre-formatted body requires a closing tag")
            }
            Self::PreFormattedStandalone => write!(f, "a pre-formatted body cannot be standalone"),
            Self::ImplicitCloseStandalone => {
                write!(f, "a tag that does not require closing cannot be standalone")
            }
        }
    }
}
