//! anchor - structural data validation against declarative rulesets
//!
//! Given an arbitrary value and a ruleset, anchor recursively decides whether
//! the value conforms and reports the first violation.
//!
//! # Architecture
//!
//! - [`Datum`] — The value under validation (JSON-like, plus `Undefined` and `Date`)
//! - [`Ruleset`] — Tagged union: `Named`, `Pattern`, `EachOf`, `KeyedSchema`
//! - [`Predicate`] — Pure leaf check: `(datum, arg) -> Result<bool, PredicateError>`
//! - [`Registry`] — Immutable name → predicate table, frozen by [`RegistryBuilder::build`]
//! - [`Validator`] — Walks a ruleset against data (deep matcher + leaf matcher)
//!
//! # Key Design Insights
//!
//! 1. **Shape is decided at construction**: a [`Ruleset`] knows whether it is a
//!    leaf or a composite. Classification never consults the registry.
//!
//! 2. **First failure wins**: composite rulesets are a short-circuit conjunction.
//!    A call either succeeds or yields exactly one [`ValidationError`].
//!
//! 3. **Two failure contracts, one engine**: [`Validator::validate`] returns the
//!    error, [`Validator::validate_or_else`] hands it to a caller-supplied handler.
//!
//! # Example
//!
//! ```
//! use anchor::prelude::*;
//!
//! let ruleset = Ruleset::keyed([
//!     ("name", Ruleset::named("string")),
//!     ("age", Ruleset::named("integer")),
//! ]);
//!
//! let person = Datum::object([("name", Datum::from("Al")), ("age", Datum::from(30))]);
//! assert!(anchor::validate(&person, &ruleset).is_ok());
//!
//! let err = anchor::validate(&Datum::object([("name", "Al")]), &ruleset).unwrap_err();
//! assert!(err.is_failure());
//! assert_eq!(err.to_string(), "validation failed at $.age: undefined does not satisfy \"integer\"");
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod builtins;
mod datum;
mod deep_match;
mod matcher;
mod path;
mod predicate;
mod registry;
mod ruleset;
mod validator;

#[cfg(feature = "serde")]
mod config;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

pub use builtins::register_builtins;
pub use datum::Datum;
pub use predicate::{FnPredicate, IsArray, IsObject, PatternPredicate, Predicate, PredicateError};
pub use registry::{Registry, RegistryBuilder};
pub use ruleset::{NamedRule, Pattern, Ruleset};
pub use validator::{Validator, ValidatorConfig};

/// Prelude module for convenient imports.
///
/// ```
/// use anchor::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Datum, Pattern, Predicate, PredicateError, Registry, RegistryBuilder, Ruleset,
        ValidationError, Validator, ValidatorConfig,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Default maximum nesting depth of a ruleset.
///
/// Deeper rulesets are rejected with [`ValidationError::DepthExceeded`] before
/// any data is inspected. Override per validator via [`ValidatorConfig`].
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// Maximum length for pattern rule sources.
///
/// Regex compilation is expensive even with the linear-time Rust `regex` crate.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4096;

// ═══════════════════════════════════════════════════════════════════════════════
// Entry points (default registry)
// ═══════════════════════════════════════════════════════════════════════════════

/// Validate `data` against `ruleset` with the built-in rules.
///
/// # Errors
///
/// Returns the first violation found. See [`ValidationError`].
pub fn validate(data: &Datum, ruleset: &Ruleset) -> Result<(), ValidationError> {
    Validator::global().validate(data, ruleset)
}

/// Validate `data` against `ruleset` with the built-in rules, routing the first
/// violation to `on_error` instead of returning it.
///
/// # Errors
///
/// Returns `Err` with whatever `on_error` produced.
pub fn validate_or_else<T, F>(data: &Datum, ruleset: &Ruleset, on_error: F) -> Result<(), T>
where
    F: FnOnce(ValidationError) -> T,
{
    Validator::global().validate_or_else(data, ruleset, on_error)
}

/// Returns `true` if `data` satisfies `ruleset` under the built-in rules.
#[must_use]
pub fn is_valid(data: &Datum, ruleset: &Ruleset) -> bool {
    Validator::global().is_valid(data, ruleset)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors produced while building rulesets or validating data.
///
/// Caller mistakes ([`is_caller_error`](Self::is_caller_error)) are kept apart
/// from data-dependent [`Failure`](Self::Failure)s so callers can match on the
/// variant instead of the message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A named rule has no registered predicate.
    #[error("unknown rule \"{rule}\"{}", registered_hint(.available))]
    UnknownRule {
        /// The unregistered rule name.
        rule: String,
        /// Rule names that ARE registered (sorted).
        available: Vec<String>,
    },

    /// An array schema holds more than one element.
    #[error("array schema has {len} elements, but may contain at most one")]
    MalformedSchema {
        /// Number of elements found.
        len: usize,
    },

    /// Ruleset nesting exceeds the configured maximum.
    #[error(
        "ruleset nesting reached depth {depth}, but maximum allowed is {max} \
         — does the structure link to itself?"
    )]
    DepthExceeded {
        /// Depth that was reached.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },

    /// A leaf predicate returned `false`.
    #[error("validation failed at {path}: {datum} does not satisfy \"{rule}\"")]
    Failure {
        /// Location of the offending datum, e.g. `$[1].id`.
        path: String,
        /// The offending datum.
        datum: Datum,
        /// Identifier of the rule that rejected it.
        rule: String,
    },

    /// A leaf predicate raised instead of answering.
    #[error("rule \"{rule}\" errored at {path}: {source}")]
    Predicate {
        /// Location of the datum being checked.
        path: String,
        /// Identifier of the rule that raised.
        rule: String,
        /// The underlying predicate error.
        source: PredicateError,
    },

    /// A pattern rule does not compile.
    #[error("invalid pattern \"{pattern}\": {reason}")]
    InvalidPattern {
        /// The pattern source.
        pattern: String,
        /// The compiler message.
        reason: String,
    },

    /// A pattern rule exceeds [`MAX_REGEX_PATTERN_LENGTH`].
    #[error("pattern length is {len}, but maximum allowed is {max}")]
    PatternTooLong {
        /// Actual length of the pattern.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// A ruleset document could not be turned into a [`Ruleset`].
    #[error("invalid ruleset: {reason}")]
    InvalidConfig {
        /// What was wrong with it.
        reason: String,
    },
}

impl ValidationError {
    /// Returns `true` for the ordinary, data-dependent failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// Returns `true` when the error is a programming mistake in the ruleset
    /// or its registry, independent of the data being validated.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownRule { .. }
                | Self::MalformedSchema { .. }
                | Self::InvalidPattern { .. }
                | Self::PatternTooLong { .. }
                | Self::InvalidConfig { .. }
        )
    }

    /// Stable `snake_case` name of the variant, for logs and fixtures.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownRule { .. } => "unknown_rule",
            Self::MalformedSchema { .. } => "malformed_schema",
            Self::DepthExceeded { .. } => "depth_exceeded",
            Self::Failure { .. } => "failure",
            Self::Predicate { .. } => "predicate_error",
            Self::InvalidPattern { .. } => "invalid_pattern",
            Self::PatternTooLong { .. } => "pattern_too_long",
            Self::InvalidConfig { .. } => "invalid_config",
        }
    }

    /// Location of the offending datum, when the error is tied to one.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Failure { path, .. } | Self::Predicate { path, .. } => Some(path),
            _ => None,
        }
    }
}

fn registered_hint(available: &[String]) -> String {
    if available.is_empty() {
        " — no rules are registered".to_owned()
    } else {
        format!(" — registered: {}", available.join(", "))
    }
}
