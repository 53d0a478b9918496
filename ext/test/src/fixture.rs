//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs them against the anchor engine with the
//! built-ins plus the test rules ([`crate::register`]).
//!
//! ```yaml
//! name: person
//! description: Keyed schema over an object
//! ruleset: { name: string, age: integer }
//! cases:
//!   - name: missing age
//!     data: { name: Al }
//!     expect: failure
//!     path: $.age
//! ```

use anchor::prelude::*;
use serde::{Deserialize, Deserializer};
use std::fmt;

/// A complete test fixture: one ruleset, many cases.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Ruleset document, parsed when the fixture runs so that parse errors
    /// can be expected by cases.
    pub ruleset: serde_json::Value,
    /// Overrides the default maximum depth.
    #[serde(default)]
    pub max_depth: Option<usize>,
    pub cases: Vec<TestCase>,
}

/// Test case
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestCase {
    pub name: String,
    /// The datum. Omitted means absent (`undefined`); `null` means null.
    #[serde(default, deserialize_with = "present")]
    pub data: Option<Datum>,
    pub expect: Expect,
    /// Expected failure location, e.g. `$[1].id`.
    #[serde(default)]
    pub path: Option<String>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Datum>, D::Error> {
    Datum::deserialize(deserializer).map(Some)
}

/// Expected outcome of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expect {
    Valid,
    Failure,
    UnknownRule,
    MalformedSchema,
    DepthExceeded,
    PredicateError,
    InvalidPattern,
    InvalidConfig,
}

impl Expect {
    /// Same names as [`ValidationError::kind`], plus `valid`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Failure => "failure",
            Self::UnknownRule => "unknown_rule",
            Self::MalformedSchema => "malformed_schema",
            Self::DepthExceeded => "depth_exceeded",
            Self::PredicateError => "predicate_error",
            Self::InvalidPattern => "invalid_pattern",
            Self::InvalidConfig => "invalid_config",
        }
    }
}

impl fmt::Display for Expect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TestCase {
    /// The datum under test.
    #[must_use]
    pub fn datum(&self) -> Datum {
        self.data.clone().unwrap_or_default()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: Expect,
    /// `valid` or the error kind.
    pub actual: &'static str,
    /// The error message, when there was one.
    pub message: Option<String>,
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Run all test cases and return results
    #[must_use]
    pub fn run(&self) -> Vec<CaseResult> {
        let mut validator = crate::test_validator();
        if let Some(max_depth) = self.max_depth {
            validator = validator.with_max_depth(max_depth);
        }
        let ruleset = Ruleset::from_json(&self.ruleset);

        self.cases
            .iter()
            .map(|case| {
                let outcome = ruleset
                    .as_ref()
                    .map_err(Clone::clone)
                    .and_then(|ruleset| validator.validate(&case.datum(), ruleset));

                let (actual, message, path) = match &outcome {
                    Ok(()) => ("valid", None, None),
                    Err(e) => (e.kind(), Some(e.to_string()), e.path()),
                };
                let path_ok = case.path.as_deref().is_none_or(|want| path == Some(want));

                CaseResult {
                    case_name: case.name.clone(),
                    passed: actual == case.expect.as_str() && path_ok,
                    expected: case.expect,
                    actual,
                    message,
                }
            })
            .collect()
    }

    /// Run all test cases and panic on first failure
    pub fn run_and_assert(&self) {
        for result in self.run() {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: expected {}, got {} ({})",
                self.name,
                result.case_name,
                result.expected,
                result.actual,
                result.message.as_deref().unwrap_or("no error"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERSON: &str = r#"
name: person
description: Keyed schema over an object
ruleset: { name: string, age: integer }
cases:
  - name: complete
    data: { name: Al, age: 30 }
    expect: valid
  - name: missing age
    data: { name: Al }
    expect: failure
    path: $.age
  - name: absent
    expect: failure
    path: $.name
"#;

    #[test]
    fn parse_fixture() {
        let fixture = Fixture::from_yaml(PERSON).unwrap();
        assert_eq!(fixture.name, "person");
        assert_eq!(fixture.cases.len(), 3);
        assert_eq!(fixture.cases[1].expect, Expect::Failure);
        assert_eq!(fixture.cases[1].path.as_deref(), Some("$.age"));
        assert!(fixture.cases[2].data.is_none());
    }

    #[test]
    fn null_data_is_not_absent() {
        let fixture = Fixture::from_yaml(
            "
name: null vs absent
ruleset: 'null'
cases:
  - name: explicit null
    data: null
    expect: valid
  - name: absent
    expect: failure
",
        )
        .unwrap();
        assert_eq!(fixture.cases[0].datum(), Datum::Null);
        assert_eq!(fixture.cases[1].datum(), Datum::Undefined);
        fixture.run_and_assert();
    }

    #[test]
    fn run_reports_per_case() {
        let fixture = Fixture::from_yaml(PERSON).unwrap();
        let results = fixture.run();
        assert!(results.iter().all(|r| r.passed), "{results:?}");
        assert_eq!(results[0].actual, "valid");
        assert_eq!(results[1].actual, "failure");
    }

    #[test]
    fn wrong_path_fails_case() {
        let fixture = Fixture::from_yaml(
            "
name: wrong path
ruleset: { a: string }
cases:
  - name: reports $.a, not $.b
    data: {}
    expect: failure
    path: $.b
",
        )
        .unwrap();
        assert!(!fixture.run()[0].passed);
    }

    #[test]
    fn ruleset_errors_apply_to_every_case() {
        let fixture = Fixture::from_yaml(
            "
name: malformed
ruleset: [string, number]
cases:
  - name: array
    data: [1]
    expect: malformed_schema
  - name: scalar
    data: 1
    expect: malformed_schema
",
        )
        .unwrap();
        fixture.run_and_assert();
    }

    #[test]
    fn multi_document() {
        let yaml = format!("{PERSON}---\n{PERSON}");
        let fixtures = Fixture::from_yaml_multi(&yaml).unwrap();
        assert_eq!(fixtures.len(), 2);
    }
}
