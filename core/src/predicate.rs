//! `Predicate` — A single leaf check
//!
//! Predicates answer one question about one datum. They are pure: they never
//! mutate the datum, and an ordinary "no" is `Ok(false)`, not an error.
//! `Err` is reserved for the predicate itself being unable to answer, e.g. a
//! comparison argument that is not a date.
//!
//! # Available Predicates
//!
//! - [`FnPredicate`] — Wraps a plain function or closure
//! - [`PatternPredicate`] — String datum matching a [`Pattern`]
//! - [`IsArray`] / [`IsObject`] — The `[]` and `{}` structural markers

use crate::{Datum, Pattern};
use std::fmt::{self, Debug};

/// Error raised by a predicate that cannot evaluate its input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct PredicateError {
    message: String,
}

impl PredicateError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A pure check over a [`Datum`].
///
/// `arg` carries the rule's auxiliary argument when one was given, e.g. the
/// version in `uuid:4` or the date in `after:2020-01-01`.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: a built [`Registry`](crate::Registry)
/// is shared across threads.
///
/// # Example
///
/// ```
/// use anchor::{Datum, Predicate, PredicateError};
///
/// #[derive(Debug)]
/// struct Even;
///
/// impl Predicate for Even {
///     fn test(&self, datum: &Datum, _arg: Option<&Datum>) -> Result<bool, PredicateError> {
///         Ok(datum.as_number().is_some_and(|n| n % 2.0 == 0.0))
///     }
/// }
///
/// assert_eq!(Even.test(&Datum::from(4), None), Ok(true));
/// assert_eq!(Even.test(&Datum::from("4"), None), Ok(false));
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Predicate`",
    label = "this type cannot check a Datum",
    note = "wrap plain functions with `FnPredicate::new`, or register them with `RegistryBuilder::rule_fn`"
)]
pub trait Predicate: Send + Sync + Debug {
    /// Check `datum`, returning `Ok(false)` for an ordinary mismatch.
    ///
    /// # Errors
    ///
    /// Returns [`PredicateError`] when the check cannot be performed.
    fn test(&self, datum: &Datum, arg: Option<&Datum>) -> Result<bool, PredicateError>;
}

#[diagnostic::do_not_recommend]
impl Predicate for Box<dyn Predicate> {
    fn test(&self, datum: &Datum, arg: Option<&Datum>) -> Result<bool, PredicateError> {
        (**self).test(datum, arg)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Function predicates
// ═══════════════════════════════════════════════════════════════════════════════

/// A predicate backed by a function or closure.
///
/// # Example
///
/// ```
/// use anchor::{Datum, FnPredicate, Predicate};
///
/// let positive = FnPredicate::new("positive", |d: &Datum, _: Option<&Datum>| {
///     Ok(d.as_number().is_some_and(|n| n > 0.0))
/// });
/// assert_eq!(positive.test(&Datum::from(3), None), Ok(true));
/// ```
pub struct FnPredicate<F> {
    name: String,
    f: F,
}

impl<F> FnPredicate<F>
where
    F: Fn(&Datum, Option<&Datum>) -> Result<bool, PredicateError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Debug for FnPredicate<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FnPredicate").field(&self.name).finish()
    }
}

impl<F> Predicate for FnPredicate<F>
where
    F: Fn(&Datum, Option<&Datum>) -> Result<bool, PredicateError> + Send + Sync,
{
    fn test(&self, datum: &Datum, arg: Option<&Datum>) -> Result<bool, PredicateError> {
        (self.f)(datum, arg)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Pattern predicate
// ═══════════════════════════════════════════════════════════════════════════════

/// Matches string data against a [`Pattern`]. Non-strings never match.
///
/// # Example
///
/// ```
/// use anchor::{Datum, Pattern, PatternPredicate, Predicate};
///
/// let p = PatternPredicate::new(Pattern::new("^[a-z]+$").unwrap());
/// assert_eq!(p.test(&Datum::from("abc"), None), Ok(true));
/// assert_eq!(p.test(&Datum::from("ABC"), None), Ok(false));
/// assert_eq!(p.test(&Datum::from(5), None), Ok(false));
/// ```
#[derive(Debug, Clone)]
pub struct PatternPredicate {
    pattern: Pattern,
}

impl PatternPredicate {
    #[must_use]
    pub fn new(pattern: Pattern) -> Self {
        Self { pattern }
    }

    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }
}

impl Predicate for PatternPredicate {
    fn test(&self, datum: &Datum, _arg: Option<&Datum>) -> Result<bool, PredicateError> {
        Ok(pattern_test(&self.pattern, datum))
    }
}

/// Borrowing twin of [`PatternPredicate`], used for inline pattern rules so a
/// ruleset's pattern is never cloned per check.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PatternRef<'p>(pub(crate) &'p Pattern);

impl Predicate for PatternRef<'_> {
    fn test(&self, datum: &Datum, _arg: Option<&Datum>) -> Result<bool, PredicateError> {
        Ok(pattern_test(self.0, datum))
    }
}

/// The match outcome of a pattern rule. Non-strings never match.
fn pattern_test(pattern: &Pattern, datum: &Datum) -> bool {
    datum.as_str().is_some_and(|s| pattern.is_match(s))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Structural markers
// ═══════════════════════════════════════════════════════════════════════════════

/// The `[]` marker: the datum is an array.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsArray;

impl Predicate for IsArray {
    fn test(&self, datum: &Datum, _arg: Option<&Datum>) -> Result<bool, PredicateError> {
        Ok(datum.is_array())
    }
}

/// The `{}` marker: the datum is an object.
///
/// Arrays and dates count as objects here; only scalars, `null` and absent
/// values are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsObject;

impl Predicate for IsObject {
    fn test(&self, datum: &Datum, _arg: Option<&Datum>) -> Result<bool, PredicateError> {
        Ok(matches!(
            datum,
            Datum::Object(_) | Datum::Array(_) | Datum::Date(_)
        ))
    }
}
