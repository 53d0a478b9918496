//! Loading rulesets and data from JSON/YAML documents.
//!
//! Enabled by the `serde` feature. Documents are read through
//! [`serde_json::Value`], so any serde format that can produce one (JSON,
//! YAML, ...) works.
//!
//! # Ruleset documents
//!
//! | Document value | Ruleset |
//! |----------------|---------|
//! | `"string"` | `Named("string")` |
//! | `"uuid:4"` | `Named("uuid")` with argument `4` |
//! | `"/^[a-z]+$/i"` | `Pattern` with flags |
//! | `[]` | any array |
//! | `[rule]` | each element matches `rule` |
//! | `[a, b, ...]` | [`ValidationError::MalformedSchema`] |
//! | `{}` | any object |
//! | `{key: rule, ...}` | keyed schema, in document order |
//! | anything else | [`ValidationError::InvalidConfig`] |
//!
//! # Example
//!
//! ```
//! use anchor::{Datum, Ruleset};
//!
//! let rules: Ruleset = serde_json::from_str(r#"[{"id": "integer", "ref": "uuid:4"}]"#).unwrap();
//! let data: Datum = serde_json::from_str(r#"[{"id": 1, "ref": "713ae7e3-cb32-45f9-adcb-7c4fa86b90c1"}]"#).unwrap();
//! assert!(anchor::is_valid(&data, &rules));
//! ```

use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

use crate::{Datum, NamedRule, Pattern, Ruleset, ValidationError};

// ═══════════════════════════════════════════════════════════════════════════════
// Rulesets
// ═══════════════════════════════════════════════════════════════════════════════

impl Ruleset {
    /// Build a ruleset from a JSON document value.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::MalformedSchema`] — an array with more than one element
    /// - [`ValidationError::InvalidPattern`] / [`ValidationError::PatternTooLong`] — bad pattern
    /// - [`ValidationError::InvalidConfig`] — a value that is not a rule
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        match value {
            Value::String(s) => parse_rule_str(s),
            Value::Array(items) => {
                let items = items
                    .iter()
                    .map(Self::from_json)
                    .collect::<Result<Vec<_>, _>>()?;
                Self::from_items(items)
            }
            Value::Object(map) => map
                .iter()
                .map(|(key, rule)| Ok((key.clone(), Self::from_json(rule)?)))
                .collect::<Result<Vec<_>, ValidationError>>()
                .map(Self::KeyedSchema),
            other => Err(ValidationError::InvalidConfig {
                reason: format!(
                    "expected a rule name, pattern, array or object, found {}",
                    json_kind(other)
                ),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for Ruleset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(de::Error::custom)
    }
}

/// `"/source/flags"` is a pattern, `"name:arg"` a named rule with an
/// argument, anything else a plain rule name.
fn parse_rule_str(s: &str) -> Result<Ruleset, ValidationError> {
    if let Some((source, flags)) = s.strip_prefix('/').and_then(|rest| rest.rsplit_once('/')) {
        return Pattern::with_flags(source, flags).map(Ruleset::Pattern);
    }

    if s.is_empty() {
        return Err(ValidationError::InvalidConfig {
            reason: "rule name is empty".to_owned(),
        });
    }

    Ok(match s.split_once(':') {
        Some((name, arg)) if !name.is_empty() => {
            Ruleset::Named(NamedRule::with_arg(name, parse_arg(arg)))
        }
        _ => Ruleset::named(s),
    })
}

/// Numeric arguments become numbers, everything else stays a string.
fn parse_arg(arg: &str) -> Datum {
    match arg.parse::<f64>() {
        Ok(n) if n.is_finite() => Datum::Number(n),
        _ => Datum::from(arg),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Data
// ═══════════════════════════════════════════════════════════════════════════════

impl From<&Value> for Datum {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => Self::String(s.clone()),
            Value::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
            Value::Object(map) => Self::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for Datum {
    fn from(value: Value) -> Self {
        Self::from(&value)
    }
}

impl<'de> Deserialize<'de> for Datum {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from)
    }
}
