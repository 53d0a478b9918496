//! Location of a datum inside the value under validation.
//!
//! Paths are built on the stack as the deep matcher descends: each level
//! borrows its parent, so nothing is allocated until a failure is rendered.

use std::fmt;

#[derive(Debug, Clone, Copy)]
enum Segment<'p> {
    Root,
    Key(&'p str),
    /// A value reached by iterating an object, always written `["key"]`.
    Member(&'p str),
    Index(usize),
}

/// A borrowed, linked path such as `$.users[1].email`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Path<'p> {
    parent: Option<&'p Path<'p>>,
    segment: Segment<'p>,
}

impl<'p> Path<'p> {
    pub(crate) const fn root() -> Self {
        Self {
            parent: None,
            segment: Segment::Root,
        }
    }

    pub(crate) fn key(&'p self, key: &'p str) -> Self {
        Self {
            parent: Some(self),
            segment: Segment::Key(key),
        }
    }

    pub(crate) fn member(&'p self, key: &'p str) -> Self {
        Self {
            parent: Some(self),
            segment: Segment::Member(key),
        }
    }

    pub(crate) fn index(&'p self, index: usize) -> Self {
        Self {
            parent: Some(self),
            segment: Segment::Index(index),
        }
    }
}

impl fmt::Display for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = self.parent {
            write!(f, "{parent}")?;
        }
        match self.segment {
            Segment::Root => f.write_str("$"),
            Segment::Key(key) if is_identifier(key) => write!(f, ".{key}"),
            Segment::Key(key) | Segment::Member(key) => write!(f, "[{key:?}]"),
            Segment::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// Keys that can be written as `.key` rather than `["key"]`.
fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
