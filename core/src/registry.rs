//! Rule registry: name → predicate.
//!
//! Named rules in a [`Ruleset`](crate::Ruleset) are resolved here at check
//! time. The registry is assembled with a [`RegistryBuilder`] and frozen by
//! [`build()`](RegistryBuilder::build); a built registry never changes, so a
//! single instance can back any number of concurrent validations.
//!
//! # Three Ways to Register
//!
//! | Method | Takes | Typical use |
//! |--------|-------|-------------|
//! | [`rule`](RegistryBuilder::rule) | any [`Predicate`] | Stateful or reusable checks |
//! | [`rule_fn`](RegistryBuilder::rule_fn) | function or closure | One-off checks |
//! | [`pattern`](RegistryBuilder::pattern) | [`Pattern`] | Named regular expressions |
//!
//! Registering a name twice replaces the earlier predicate.
//!
//! # Example
//!
//! ```
//! use anchor::{Datum, Pattern, RegistryBuilder};
//!
//! let registry = RegistryBuilder::with_builtins()
//!     .rule_fn("positive", |d: &Datum, _: Option<&Datum>| {
//!         Ok(d.as_number().is_some_and(|n| n > 0.0))
//!     })
//!     .pattern("slug", Pattern::new("^[a-z0-9-]+$").unwrap())
//!     .build();
//!
//! assert!(registry.contains("positive"));
//! assert!(registry.contains("slug"));
//! assert!(registry.contains("email"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::{
    register_builtins, Datum, FnPredicate, Pattern, PatternPredicate, Predicate, PredicateError,
    ValidationError,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for constructing a [`Registry`].
///
/// No registration is possible once [`build()`](Self::build) has been called.
#[derive(Default)]
pub struct RegistryBuilder {
    rules: HashMap<String, Arc<dyn Predicate>>,
}

impl RegistryBuilder {
    /// Create an empty registry builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Create a builder pre-loaded with the built-in rules.
    #[must_use]
    pub fn with_builtins() -> Self {
        register_builtins(Self::new())
    }

    /// Register a predicate under `name`.
    #[must_use]
    pub fn rule<P: Predicate + 'static>(mut self, name: impl Into<String>, predicate: P) -> Self {
        let name = name.into();
        if self.rules.insert(name.clone(), Arc::new(predicate)).is_some() {
            tracing::debug!(rule = %name, "rule replaced");
        }
        self
    }

    /// Register a function or closure under `name`.
    #[must_use]
    pub fn rule_fn<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Datum, Option<&Datum>) -> Result<bool, PredicateError> + Send + Sync + 'static,
    {
        let name = name.into();
        let predicate = FnPredicate::new(name.clone(), f);
        self.rule(name, predicate)
    }

    /// Register a named pattern: string data must match it.
    #[must_use]
    pub fn pattern(self, name: impl Into<String>, pattern: Pattern) -> Self {
        self.rule(name, PatternPredicate::new(pattern))
    }

    /// Freeze the registry.
    #[must_use]
    pub fn build(self) -> Registry {
        tracing::debug!(rules = self.rules.len(), "registry built");
        Registry { rules: self.rules }
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("rules", &sorted_names(&self.rules))
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable table of named rules.
///
/// Constructed via [`RegistryBuilder`].
#[derive(Clone)]
pub struct Registry {
    rules: HashMap<String, Arc<dyn Predicate>>,
}

impl Registry {
    /// Look up the predicate registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownRule`] listing the registered names.
    pub fn resolve(&self, name: &str) -> Result<&dyn Predicate, ValidationError> {
        self.rules
            .get(name)
            .map(AsRef::as_ref)
            .ok_or_else(|| ValidationError::UnknownRule {
                rule: name.to_owned(),
                available: self.rule_names().into_iter().map(str::to_owned).collect(),
            })
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns `true` if a rule is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Returns all registered rule names (sorted).
    #[must_use]
    pub fn rule_names(&self) -> Vec<&str> {
        sorted_names(&self.rules)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("rules", &self.rule_names())
            .finish()
    }
}

fn sorted_names(rules: &HashMap<String, Arc<dyn Predicate>>) -> Vec<&str> {
    let mut names: Vec<&str> = rules.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}
