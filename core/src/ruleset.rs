//! `Ruleset` — What a datum is checked against
//!
//! A ruleset is one of four shapes, fixed when it is built:
//!
//! | Shape | Constructor | Meaning |
//! |-------|-------------|---------|
//! | `Named` | [`Ruleset::named`] | Look the rule up in the [`Registry`](crate::Registry) |
//! | `Pattern` | [`Ruleset::pattern`] | Datum is a string the expression matches |
//! | `EachOf` | [`Ruleset::each`] / [`Ruleset::any_array`] | Every element matches / is an array |
//! | `KeyedSchema` | [`Ruleset::keyed`] / [`Ruleset::any_object`] | Every key matches / is an object |
//!
//! Classification happens here, structurally. The registry is only consulted
//! later, by the leaf matcher, for `Named` rules.

use crate::{Datum, ValidationError, MAX_REGEX_PATTERN_LENGTH};
use regex::{Regex, RegexBuilder};
use std::fmt;

/// A declarative ruleset.
///
/// # Example
///
/// ```
/// use anchor::Ruleset;
///
/// // [{ id: "integer", tags: ["string"] }]
/// let rules = Ruleset::each(Ruleset::keyed([
///     ("id", Ruleset::named("integer")),
///     ("tags", Ruleset::each(Ruleset::named("string"))),
/// ]));
/// assert_eq!(rules.depth(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Ruleset {
    /// A registered rule, optionally with an auxiliary argument.
    Named(NamedRule),

    /// A regular expression the (string) datum must match.
    Pattern(Pattern),

    /// Array schema. `None` only requires an array; `Some(rule)` requires every
    /// element to satisfy `rule`.
    EachOf(Option<Box<Ruleset>>),

    /// Object schema, in declaration order. Empty only requires an object.
    KeyedSchema(Vec<(String, Ruleset)>),
}

impl Ruleset {
    /// A rule looked up by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(NamedRule::new(name))
    }

    /// A rule looked up by name, called with an auxiliary argument
    /// (a UUID version, a comparison date).
    pub fn named_with(name: impl Into<String>, arg: impl Into<Datum>) -> Self {
        Self::Named(NamedRule::with_arg(name, arg))
    }

    /// A pattern rule.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPattern`] or
    /// [`ValidationError::PatternTooLong`].
    pub fn pattern(source: &str) -> Result<Self, ValidationError> {
        Pattern::new(source).map(Self::Pattern)
    }

    /// Every element of the data array must satisfy `rule`.
    pub fn each(rule: Ruleset) -> Self {
        Self::EachOf(Some(Box::new(rule)))
    }

    /// The datum must be an array (the `[]` marker).
    #[must_use]
    pub fn any_array() -> Self {
        Self::EachOf(None)
    }

    /// The datum must be an object (the `{}` marker).
    #[must_use]
    pub fn any_object() -> Self {
        Self::KeyedSchema(Vec::new())
    }

    /// Object schema from `(key, rule)` pairs, kept in the given order.
    pub fn keyed<K: Into<String>>(entries: impl IntoIterator<Item = (K, Ruleset)>) -> Self {
        Self::KeyedSchema(entries.into_iter().map(|(k, r)| (k.into(), r)).collect())
    }

    /// Array schema from a list of element rules, as written in a document.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MalformedSchema`] for more than one element.
    pub fn from_items(mut items: Vec<Ruleset>) -> Result<Self, ValidationError> {
        match items.len() {
            0 => Ok(Self::any_array()),
            1 => Ok(Self::each(items.remove(0))),
            len => Err(ValidationError::MalformedSchema { len }),
        }
    }

    /// Returns `true` for shapes that resolve to a single predicate.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self.classify(), Shape::Leaf(_))
    }

    /// Nesting depth: the number of composite rulesets on the deepest path.
    ///
    /// Leaves (including the `[]` and `{}` markers) have depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self.classify() {
            Shape::Leaf(_) => 0,
            Shape::Each(inner) => 1 + inner.depth(),
            Shape::Keys(entries) => {
                1 + entries
                    .iter()
                    .map(|(_, rule)| rule.depth())
                    .max()
                    .unwrap_or(0)
            }
        }
    }

    /// Returns `true` if [`depth`](Self::depth) is at most `max`.
    ///
    /// Stops descending after `max` levels, so it is safe on rulesets far
    /// deeper than the limit.
    #[must_use]
    pub fn depth_within(&self, max: usize) -> bool {
        match self.classify() {
            Shape::Leaf(_) => true,
            Shape::Each(inner) => max > 0 && inner.depth_within(max - 1),
            Shape::Keys(entries) => {
                max > 0 && entries.iter().all(|(_, rule)| rule.depth_within(max - 1))
            }
        }
    }

    pub(crate) fn classify(&self) -> Shape<'_> {
        match self {
            Self::Named(rule) => Shape::Leaf(Leaf::Named(rule)),
            Self::Pattern(pattern) => Shape::Leaf(Leaf::Pattern(pattern)),
            Self::EachOf(None) => Shape::Leaf(Leaf::AnyArray),
            Self::EachOf(Some(inner)) => Shape::Each(inner),
            Self::KeyedSchema(entries) if entries.is_empty() => Shape::Leaf(Leaf::AnyObject),
            Self::KeyedSchema(entries) => Shape::Keys(entries),
        }
    }
}

impl fmt::Display for Ruleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(rule) => write!(f, "{rule}"),
            Self::Pattern(pattern) => write!(f, "{pattern}"),
            Self::EachOf(None) => f.write_str("[]"),
            Self::EachOf(Some(inner)) => write!(f, "[{inner}]"),
            Self::KeyedSchema(entries) => {
                f.write_str("{")?;
                for (i, (key, rule)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {rule}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for Ruleset {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<NamedRule> for Ruleset {
    fn from(rule: NamedRule) -> Self {
        Self::Named(rule)
    }
}

impl From<Pattern> for Ruleset {
    fn from(pattern: Pattern) -> Self {
        Self::Pattern(pattern)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Shapes
// ═══════════════════════════════════════════════════════════════════════════════

/// Structural classification of a ruleset, borrowed from it.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Shape<'r> {
    Leaf(Leaf<'r>),
    Each(&'r Ruleset),
    Keys(&'r [(String, Ruleset)]),
}

/// A ruleset that resolves to exactly one predicate.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Leaf<'r> {
    AnyArray,
    AnyObject,
    Pattern(&'r Pattern),
    Named(&'r NamedRule),
}

impl Leaf<'_> {
    /// Identifier reported in failures.
    pub(crate) fn identifier(&self) -> String {
        match self {
            Self::AnyArray => "[]".to_owned(),
            Self::AnyObject => "{}".to_owned(),
            Self::Pattern(pattern) => pattern.to_string(),
            Self::Named(rule) => rule.name().to_owned(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Named rules
// ═══════════════════════════════════════════════════════════════════════════════

/// A rule name plus its optional auxiliary argument.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedRule {
    name: String,
    arg: Option<Datum>,
}

impl NamedRule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arg: None,
        }
    }

    pub fn with_arg(name: impl Into<String>, arg: impl Into<Datum>) -> Self {
        Self {
            name: name.into(),
            arg: Some(arg.into()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn arg(&self) -> Option<&Datum> {
        self.arg.as_ref()
    }
}

impl fmt::Display for NamedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.arg {
            Some(arg) => write!(f, "{}:{}", self.name, arg.coerce_str()),
            None => f.write_str(&self.name),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Patterns
// ═══════════════════════════════════════════════════════════════════════════════

/// A compiled pattern rule.
///
/// Matching is unanchored: the expression may match anywhere in the string.
/// Anchor with `^`/`$` to match the whole value.
///
/// # Example
///
/// ```
/// use anchor::Pattern;
///
/// let p = Pattern::with_flags("^user-\\d+$", "i").unwrap();
/// assert!(p.is_match("USER-42"));
/// assert_eq!(p.to_string(), "/^user-\\d+$/i");
/// ```
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    flags: String,
}

impl Pattern {
    /// Compile a pattern without flags.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPattern`] if the expression does not
    /// compile, or [`ValidationError::PatternTooLong`] if it exceeds
    /// [`MAX_REGEX_PATTERN_LENGTH`].
    pub fn new(source: &str) -> Result<Self, ValidationError> {
        Self::with_flags(source, "")
    }

    /// Compile a pattern with flags.
    ///
    /// Supported: `i` (case-insensitive), `m` (multi-line), `s` (`.` matches
    /// newline), `x` (ignore whitespace). `g`, `u` and `y` are accepted and
    /// have no effect on a yes/no match.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new), plus [`ValidationError::InvalidPattern`] for an
    /// unsupported flag.
    pub fn with_flags(source: &str, flags: &str) -> Result<Self, ValidationError> {
        if source.len() > MAX_REGEX_PATTERN_LENGTH {
            return Err(ValidationError::PatternTooLong {
                len: source.len(),
                max: MAX_REGEX_PATTERN_LENGTH,
            });
        }

        let mut builder = RegexBuilder::new(source);
        for flag in flags.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'x' => builder.ignore_whitespace(true),
                'g' | 'u' | 'y' => &mut builder,
                other => {
                    return Err(ValidationError::InvalidPattern {
                        pattern: source.to_owned(),
                        reason: format!("unsupported flag '{other}'"),
                    })
                }
            };
        }

        let regex = builder
            .build()
            .map_err(|e| ValidationError::InvalidPattern {
                pattern: source.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            regex,
            flags: flags.to_owned(),
        })
    }

    /// Returns `true` if the expression matches somewhere in `haystack`.
    #[inline]
    #[must_use]
    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }

    /// The expression source, without delimiters or flags.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    #[must_use]
    pub fn flags(&self) -> &str {
        &self.flags
    }
}

// Regex has no PartialEq; two patterns are equal when written the same way.
impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str() && self.flags == other.flags
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.as_str(), self.flags)
    }
}
