//! Per-tag behaviour flags and the case-insensitive policy map.
//!
//! A [`TagAttributes`] record changes how the scanner treats one tag name: whether the
//! tag closes implicitly, whether its body is opaque text, whether it is a standalone
//! marker with no body at all. Names without an entry behave as ordinary tags.
use std::sync::LazyLock;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{Conflict, Error};

/// The four behaviour flags attached to a tag name.
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TagAttributes {
    /// The tag closes implicitly when a sibling or ancestor closes (list items).
    pub does_not_require_closing_tag: bool,
    /// The body is literal text up to the matching closing tag.
    pub has_pre_formatted_body: bool,
    /// The tag has neither body nor closing tag.
    pub standalone: bool,
    /// Renderers turn newlines inside the body into line breaks.
    pub transform_new_lines: bool,
}

impl TagAttributes {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            does_not_require_closing_tag: false,
            has_pre_formatted_body: false,
            standalone: false,
            transform_new_lines: false,
        }
    }

    #[must_use]
    pub const fn does_not_require_closing_tag(mut self) -> Self {
        self.does_not_require_closing_tag = true;
        self
    }

    #[must_use]
    pub const fn pre_formatted_body(mut self) -> Self {
        self.has_pre_formatted_body = true;
        self
    }

    #[must_use]
    pub const fn standalone(mut self) -> Self {
        self.standalone = true;
        self
    }

    #[must_use]
    pub const fn transform_new_lines(mut self) -> Self {
        self.transform_new_lines = true;
        self
    }

    /// Reject flag combinations the scanner cannot honour.
    ///
    /// The scanner never calls this: it follows the flags as given. Callers are
    /// expected to validate their policies once, before parsing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncoherentTagAttributes`] naming the first conflict found.
    pub fn validate(self) -> Result<(), Error> {
        if self.has_pre_formatted_body {
            if self.does_not_require_closing_tag {
                return Err(Error::IncoherentTagAttributes(
                    Conflict::PreFormattedWithoutClosingTag,
                ));
            }
            if self.standalone {
                return Err(Error::IncoherentTagAttributes(
                    Conflict::PreFormattedStandalone,
                ));
            }
        }
        if self.does_not_require_closing_tag && self.standalone {
            return Err(Error::IncoherentTagAttributes(
                Conflict::ImplicitCloseStandalone,
            ));
        }
        Ok(())
    }
}

/// Mapping from lowercase tag name to its [`TagAttributes`].
///
/// Keys are lowercased on insertion and on lookup, so queries are case-insensitive.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FxHashMap<String, TagAttributes>")]
pub struct TagPolicies(FxHashMap<String, TagAttributes>);

impl From<FxHashMap<String, TagAttributes>> for TagPolicies {
    fn from(map: FxHashMap<String, TagAttributes>) -> Self {
        map.into_iter().collect()
    }
}

impl FromIterator<(String, TagAttributes)> for TagPolicies {
    fn from_iter<I: IntoIterator<Item = (String, TagAttributes)>>(iter: I) -> Self {
        let mut policies = Self::default();
        for (name, attributes) in iter {
            policies.insert(&name, attributes);
        }
        policies
    }
}

impl<'a> FromIterator<(&'a str, TagAttributes)> for TagPolicies {
    fn from_iter<I: IntoIterator<Item = (&'a str, TagAttributes)>>(iter: I) -> Self {
        let mut policies = Self::default();
        for (name, attributes) in iter {
            policies.insert(name, attributes);
        }
        policies
    }
}

impl TagPolicies {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load policies from a JSON object keyed by tag name.
    ///
    /// ```
    /// use tagmark_parser::TagPolicies;
    ///
    /// let policies = TagPolicies::from_json(r#"{"Code": {"hasPreFormattedBody": true}}"#)?;
    /// assert!(policies.has_pre_formatted_body("code"));
    /// # Ok::<(), tagmark_parser::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] when the input is not a valid policy object.
    pub fn from_json(input: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(input)?)
    }

    /// Insert (or replace) the policy for `name`.
    pub fn insert(&mut self, name: &str, attributes: TagAttributes) -> Option<TagAttributes> {
        self.0.insert(name.to_lowercase(), attributes)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TagAttributes> {
        self.0.get(&name.to_lowercase())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagAttributes)> {
        self.0.iter().map(|(name, attributes)| (name.as_str(), attributes))
    }

    /// The flags for `name`, all false when there is no entry.
    #[must_use]
    pub fn attributes(&self, name: &str) -> TagAttributes {
        self.get(name).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn does_not_require_closing_tag(&self, name: &str) -> bool {
        self.attributes(name).does_not_require_closing_tag
    }

    #[must_use]
    pub fn has_pre_formatted_body(&self, name: &str) -> bool {
        self.attributes(name).has_pre_formatted_body
    }

    #[must_use]
    pub fn is_standalone(&self, name: &str) -> bool {
        self.attributes(name).standalone
    }

    #[must_use]
    pub fn transforms_new_lines(&self, name: &str) -> bool {
        self.attributes(name).transform_new_lines
    }

    /// Layer these policies over `defaults`; entries in `self` win per name.
    #[must_use]
    pub fn merged_over(&self, defaults: &TagPolicies) -> TagPolicies {
        let mut merged = defaults.clone();
        merged
            .0
            .extend(self.0.iter().map(|(name, attributes)| (name.clone(), *attributes)));
        merged
    }

    /// Validate every entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTagPolicy`] for the first incoherent entry, in name
    /// order so the result is deterministic.
    pub fn validate(&self) -> Result<(), Error> {
        let mut names: Vec<&String> = self.0.keys().collect();
        names.sort();
        for name in names {
            if let Some(attributes) = self.0.get(name) {
                attributes
                    .validate()
                    .map_err(|source| Error::InvalidTagPolicy {
                        tag: name.clone(),
                        source: Box::new(source),
                    })?;
            }
        }
        Ok(())
    }
}

/// Defaults for the bracket grammar.
pub static BRACKET_DEFAULTS: LazyLock<TagPolicies> = LazyLock::new(|| {
    [
        ("*", TagAttributes::new().does_not_require_closing_tag()),
        ("code", TagAttributes::new().pre_formatted_body()),
        ("noparse", TagAttributes::new().pre_formatted_body()),
        ("pre", TagAttributes::new().pre_formatted_body()),
        ("hr", TagAttributes::new().standalone()),
        ("br", TagAttributes::new().standalone()),
    ]
    .into_iter()
    .collect()
});

/// Defaults for the angle grammar: void elements, raw-text elements and `svg`.
pub static ANGLE_DEFAULTS: LazyLock<TagPolicies> = LazyLock::new(|| {
    const VOID_ELEMENTS: [&str; 14] = [
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ];
    const RAW_TEXT_ELEMENTS: [&str; 4] = ["script", "style", "textarea", "title"];

    let void = VOID_ELEMENTS
        .into_iter()
        .map(|name| (name, TagAttributes::new().standalone()));
    let raw = RAW_TEXT_ELEMENTS
        .into_iter()
        .map(|name| (name, TagAttributes::new().pre_formatted_body()));
    // svg content is never tokenized, only passed through
    let svg = std::iter::once(("svg", TagAttributes::new().pre_formatted_body()));
    void.chain(raw).chain(svg).collect()
});
