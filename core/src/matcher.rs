//! Matcher — One leaf rule against one datum
//!
//! The matcher resolves a leaf to a predicate, runs it, and turns the outcome
//! into the failure contract:
//!
//! | Predicate outcome | Result |
//! |-------------------|--------|
//! | `Ok(true)` | `Ok(())` |
//! | `Ok(false)` | [`ValidationError::Failure`] with the datum and rule identifier |
//! | `Err(e)` | [`ValidationError::Predicate`] wrapping `e` |
//! | name not registered | [`ValidationError::UnknownRule`] |
//!
//! # Resolution Order
//!
//! 1. `[]` → [`IsArray`]
//! 2. `{}` → [`IsObject`]
//! 3. pattern → the pattern itself
//! 4. name → [`Registry::resolve`], passing the rule's argument through

use crate::path::Path;
use crate::predicate::{IsArray, IsObject, PatternRef};
use crate::ruleset::Leaf;
use crate::{Datum, Predicate, Registry, ValidationError};

/// Leaf matcher bound to a registry.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Matcher<'r> {
    registry: &'r Registry,
}

impl<'r> Matcher<'r> {
    pub(crate) fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Check `datum` at `path` against a single leaf rule.
    pub(crate) fn check(
        &self,
        datum: &Datum,
        leaf: Leaf<'_>,
        path: &Path<'_>,
    ) -> Result<(), ValidationError> {
        let pattern;
        let (predicate, arg): (&dyn Predicate, Option<&Datum>) = match leaf {
            Leaf::AnyArray => (&IsArray, None),
            Leaf::AnyObject => (&IsObject, None),
            Leaf::Pattern(p) => {
                pattern = PatternRef(p);
                (&pattern, None)
            }
            Leaf::Named(rule) => (self.registry.resolve(rule.name())?, rule.arg()),
        };

        match predicate.test(datum, arg) {
            Ok(true) => {
                tracing::trace!(%path, rule = %leaf.identifier(), "leaf passed");
                Ok(())
            }
            Ok(false) => Err(ValidationError::Failure {
                path: path.to_string(),
                datum: datum.clone(),
                rule: leaf.identifier(),
            }),
            Err(source) => Err(ValidationError::Predicate {
                path: path.to_string(),
                rule: leaf.identifier(),
                source,
            }),
        }
    }
}
