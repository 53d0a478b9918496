//! anchor-test: Test rules and conformance fixtures
//!
//! Provides a handful of custom rules with predictable behavior, registered
//! on top of the built-ins, and (with the `fixtures` feature) a YAML fixture
//! runner. This is also the reference for how to extend anchor with rules of
//! your own.
//!
//! # Example
//!
//! ```
//! use anchor_test::prelude::*;
//!
//! let validator = test_validator();
//!
//! assert!(validator.is_valid(&Datum::from(4), &Ruleset::named("even")));
//! assert!(!validator.is_valid(&Datum::from(3), &Ruleset::named("even")));
//! ```

use anchor::prelude::*;

#[cfg(feature = "fixtures")]
pub mod fixture;

/// Integral numbers divisible by two.
#[derive(Debug, Clone, Copy, Default)]
pub struct Even;

impl Predicate for Even {
    fn test(&self, datum: &Datum, _arg: Option<&Datum>) -> Result<bool, PredicateError> {
        Ok(datum.as_number().is_some_and(|n| n % 2.0 == 0.0))
    }
}

/// Numbers of at least the argument (default `0`). A non-numeric argument is
/// an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtLeast;

impl Predicate for AtLeast {
    fn test(&self, datum: &Datum, arg: Option<&Datum>) -> Result<bool, PredicateError> {
        let min = match arg {
            None => 0.0,
            Some(Datum::Number(n)) => *n,
            Some(other) => {
                return Err(PredicateError::new(format!(
                    "at_least expects a numeric argument, got {other}"
                )))
            }
        };
        Ok(datum.as_number().is_some_and(|n| n >= min))
    }
}

/// Register the test rules with the given builder.
///
/// - `even` → [`Even`]
/// - `at_least` → [`AtLeast`]
/// - `slug` → lowercase words joined by hyphens
/// - `broken` → always errors
#[must_use]
pub fn register(builder: RegistryBuilder) -> RegistryBuilder {
    let builder = builder
        .rule("even", Even)
        .rule("at_least", AtLeast)
        .rule_fn("broken", |_: &Datum, _: Option<&Datum>| {
            Err(PredicateError::new("broken rule always errors"))
        });

    match Pattern::new("^[a-z0-9]+(?:-[a-z0-9]+)*$") {
        Ok(slug) => builder.pattern("slug", slug),
        Err(_) => builder,
    }
}

/// A validator with the built-ins plus the test rules.
#[must_use]
pub fn test_validator() -> Validator {
    Validator::new(register(RegistryBuilder::with_builtins()).build())
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{register, test_validator, AtLeast, Even};
    pub use anchor::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_rule() {
        assert_eq!(Even.test(&Datum::from(4), None), Ok(true));
        assert_eq!(Even.test(&Datum::from(3), None), Ok(false));
        assert_eq!(Even.test(&Datum::from("4"), None), Ok(false));
    }

    #[test]
    fn at_least_rule() {
        assert_eq!(AtLeast.test(&Datum::from(1), None), Ok(true));
        assert_eq!(AtLeast.test(&Datum::from(-1), None), Ok(false));
        assert_eq!(AtLeast.test(&Datum::from(5), Some(&Datum::from(5))), Ok(true));
        assert_eq!(AtLeast.test(&Datum::from(4), Some(&Datum::from(5))), Ok(false));
        assert!(AtLeast.test(&Datum::from(4), Some(&Datum::from("x"))).is_err());
    }

    #[test]
    fn register_adds_test_rules_over_builtins() {
        let validator = test_validator();
        let registry = validator.registry();

        for name in ["even", "at_least", "slug", "broken", "string", "email"] {
            assert!(registry.contains(name), "missing {name}");
        }
    }

    #[test]
    fn full_validation_with_test_rules() {
        let validator = test_validator();
        let ruleset = Ruleset::keyed([
            ("slug", Ruleset::named("slug")),
            ("count", Ruleset::named_with("at_least", 1)),
        ]);

        let good = Datum::object([("slug", Datum::from("hello-world")), ("count", Datum::from(3))]);
        assert!(validator.is_valid(&good, &ruleset));

        let bad = Datum::object([("slug", Datum::from("Hello World")), ("count", Datum::from(3))]);
        assert_eq!(validator.validate(&bad, &ruleset).unwrap_err().path(), Some("$.slug"));
    }

    #[test]
    fn broken_rule_is_predicate_error() {
        let err = test_validator()
            .validate(&Datum::Null, &Ruleset::named("broken"))
            .unwrap_err();
        assert_eq!(err.kind(), "predicate_error");
    }
}
