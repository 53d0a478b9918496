//! Deep matcher: reduce a composite ruleset to leaf checks.
//!
//! Composites are a short-circuit conjunction. Keyed schemas are walked in
//! declaration order and arrays in index order, so the reported failure is
//! always the first one in that order.
//!
//! An array schema treats its data as a sequence: arrays yield their
//! elements, objects their values in key order, and absent, `null` or date
//! values yield nothing. Strings, numbers and booleans are not sequences and
//! fail as `array`.
//!
//! Recursion follows the ruleset, not the data: an array schema loops over
//! its elements at a single level, so stack use is bounded by ruleset depth
//! however long the data arrays are.

use crate::matcher::Matcher;
use crate::path::Path;
use crate::ruleset::Shape;
use crate::{Datum, Registry, Ruleset, ValidationError};

/// Identifier reported when an array schema meets a scalar.
const ARRAY_RULE: &str = "array";

/// Per-call traversal state: the leaf matcher and the depth limit.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DeepMatcher<'r> {
    matcher: Matcher<'r>,
    max_depth: usize,
}

impl<'r> DeepMatcher<'r> {
    pub(crate) fn new(registry: &'r Registry, max_depth: usize) -> Self {
        Self {
            matcher: Matcher::new(registry),
            max_depth,
        }
    }

    /// Check `data` against `ruleset`, `depth` composite levels below the root.
    pub(crate) fn deep_match(
        &self,
        data: &Datum,
        ruleset: &Ruleset,
        path: &Path<'_>,
        depth: usize,
    ) -> Result<(), ValidationError> {
        if depth > self.max_depth {
            return Err(ValidationError::DepthExceeded {
                depth,
                max: self.max_depth,
            });
        }

        match ruleset.classify() {
            Shape::Leaf(leaf) => self.matcher.check(data, leaf, path),
            Shape::Each(element_rule) => match data {
                Datum::Array(items) => items.iter().enumerate().try_for_each(|(i, item)| {
                    self.deep_match(item, element_rule, &path.index(i), depth + 1)
                }),
                Datum::Object(members) => members.iter().try_for_each(|(key, item)| {
                    self.deep_match(item, element_rule, &path.member(key), depth + 1)
                }),
                Datum::Undefined | Datum::Null | Datum::Date(_) => Ok(()),
                Datum::Bool(_) | Datum::Number(_) | Datum::String(_) => {
                    Err(ValidationError::Failure {
                        path: path.to_string(),
                        datum: data.clone(),
                        rule: ARRAY_RULE.to_owned(),
                    })
                }
            },
            Shape::Keys(entries) => entries.iter().try_for_each(|(key, rule)| {
                self.deep_match(data.get(key), rule, &path.key(key), depth + 1)
            }),
        }
    }
}
