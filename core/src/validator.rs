//! `Validator` — Registry plus limits, the entry point for validation
//!
//! A validator is built once and shared. Each call builds its own traversal
//! state, so one validator can serve concurrent callers without locking.

use std::sync::{Arc, LazyLock};

use tracing::{debug, instrument};

use crate::deep_match::DeepMatcher;
use crate::path::Path;
use crate::{Datum, Registry, RegistryBuilder, Ruleset, ValidationError, DEFAULT_MAX_DEPTH};

static GLOBAL: LazyLock<Validator> = LazyLock::new(Validator::default);

/// Validation limits.
///
/// With the `serde` feature this deserializes from config; missing fields
/// take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct ValidatorConfig {
    /// Maximum ruleset nesting depth. Defaults to [`DEFAULT_MAX_DEPTH`].
    pub max_depth: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Validates data against rulesets using one [`Registry`].
///
/// # Example
///
/// ```
/// use anchor::prelude::*;
///
/// let registry = RegistryBuilder::with_builtins()
///     .rule_fn("even", |d: &Datum, _: Option<&Datum>| {
///         Ok(d.as_number().is_some_and(|n| n % 2.0 == 0.0))
///     })
///     .build();
/// let validator = Validator::new(registry);
///
/// let rules = Ruleset::each(Ruleset::named("even"));
/// assert!(validator.is_valid(&Datum::array([2, 4]), &rules));
///
/// let err = validator.validate(&Datum::array([2, 3]), &rules).unwrap_err();
/// assert_eq!(err.path(), Some("$[1]"));
/// ```
#[derive(Debug, Clone)]
pub struct Validator {
    registry: Arc<Registry>,
    config: ValidatorConfig,
}

impl Validator {
    /// Create a validator over `registry` with default limits.
    pub fn new(registry: impl Into<Arc<Registry>>) -> Self {
        Self {
            registry: registry.into(),
            config: ValidatorConfig::default(),
        }
    }

    /// The shared validator over the built-in rules.
    #[must_use]
    pub fn global() -> &'static Validator {
        &GLOBAL
    }

    #[must_use]
    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate `data` against `ruleset`.
    ///
    /// Rulesets nested deeper than the configured maximum are rejected before
    /// any data is looked at.
    ///
    /// # Errors
    ///
    /// Returns the first violation:
    /// - [`ValidationError::DepthExceeded`] — ruleset too deep
    /// - [`ValidationError::UnknownRule`] — a named rule is not registered
    /// - [`ValidationError::Failure`] — a leaf check returned `false`
    /// - [`ValidationError::Predicate`] — a leaf check could not be evaluated
    #[instrument(level = "debug", skip_all, fields(max_depth = self.config.max_depth))]
    pub fn validate(&self, data: &Datum, ruleset: &Ruleset) -> Result<(), ValidationError> {
        let max = self.config.max_depth;
        if !ruleset.depth_within(max) {
            debug!(max, "ruleset rejected before traversal");
            return Err(ValidationError::DepthExceeded {
                depth: max + 1,
                max,
            });
        }

        let result =
            DeepMatcher::new(&self.registry, max).deep_match(data, ruleset, &Path::root(), 0);
        if let Err(e) = &result {
            debug!(kind = e.kind(), error = %e, "validation failed");
        }
        result
    }

    /// Like [`validate`](Self::validate), but hands the first violation to
    /// `on_error` and returns what it produced.
    ///
    /// `on_error` is called at most once, for every kind of error.
    ///
    /// # Errors
    ///
    /// Returns `Err` with the output of `on_error`.
    pub fn validate_or_else<T, F>(
        &self,
        data: &Datum,
        ruleset: &Ruleset,
        on_error: F,
    ) -> Result<(), T>
    where
        F: FnOnce(ValidationError) -> T,
    {
        self.validate(data, ruleset).map_err(on_error)
    }

    /// Returns `true` if `data` satisfies `ruleset`.
    #[must_use]
    pub fn is_valid(&self, data: &Datum, ruleset: &Ruleset) -> bool {
        self.validate(data, ruleset).is_ok()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(RegistryBuilder::with_builtins().build())
    }
}
