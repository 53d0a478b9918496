//! End-to-end validation scenarios against the built-in rules.

use anchor::prelude::*;

fn nested_each(levels: usize) -> Ruleset {
    let mut rule = Ruleset::named("string");
    for _ in 0..levels {
        rule = Ruleset::each(rule);
    }
    rule
}

// ═══════════════════════════════════════════════════════════════════════════════
// Scalars
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn number_accepts_number() {
    assert_eq!(anchor::validate(&Datum::from(5), &Ruleset::named("number")), Ok(()));
}

#[test]
fn number_rejects_numeric_string() {
    let err = anchor::validate(&Datum::from("5"), &Ruleset::named("number")).unwrap_err();
    assert_eq!(
        err,
        ValidationError::Failure {
            path: "$".into(),
            datum: Datum::from("5"),
            rule: "number".into(),
        }
    );
}

#[test]
fn format_rules_accept_numbers_and_strings_alike() {
    let integer = Ruleset::named("integer");
    assert!(anchor::is_valid(&Datum::from(30), &integer));
    assert!(anchor::is_valid(&Datum::from("30"), &integer));
    assert!(!anchor::is_valid(&Datum::from(30.5), &integer));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Objects and arrays
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn object_schema_accepts_matching_object() {
    let ruleset = Ruleset::keyed([
        ("name", Ruleset::named("string")),
        ("age", Ruleset::named("integer")),
    ]);
    let person = Datum::object([("name", Datum::from("Al")), ("age", Datum::from(30))]);
    assert_eq!(anchor::validate(&person, &ruleset), Ok(()));
}

#[test]
fn array_of_objects_reports_second_element() {
    let ruleset = Ruleset::each(Ruleset::keyed([("id", Ruleset::named("integer"))]));
    let data = Datum::array([Datum::object([("id", 1)]), Datum::object([("id", "x")])]);

    let err = anchor::validate(&data, &ruleset).unwrap_err();
    assert!(err.is_failure());
    assert_eq!(err.path(), Some("$[1].id"));
    assert_eq!(
        err.to_string(),
        "validation failed at $[1].id: \"x\" does not satisfy \"integer\""
    );
}

#[test]
fn missing_key_fails() {
    let ruleset = Ruleset::keyed([("a", Ruleset::named("string"))]);
    let err = anchor::validate(&Datum::object(Vec::<(String, Datum)>::new()), &ruleset)
        .unwrap_err();
    assert!(err.is_failure());
    assert_eq!(err.path(), Some("$.a"));
}

#[test]
fn empty_array_satisfies_any_element_rule() {
    let empty = Datum::array(Vec::<Datum>::new());
    assert!(anchor::is_valid(&empty, &Ruleset::each(Ruleset::named("number"))));
    assert!(anchor::is_valid(&empty, &Ruleset::each(Ruleset::named("date"))));
}

#[test]
fn list_schema_treats_absent_and_null_as_empty() {
    let tags = Ruleset::each(Ruleset::named("string"));
    assert_eq!(anchor::validate(&Datum::Null, &tags), Ok(()));
    assert_eq!(anchor::validate(&Datum::Undefined, &tags), Ok(()));

    let schema = Ruleset::keyed([("tags", tags)]);
    let without_tags = Datum::object(Vec::<(String, Datum)>::new());
    assert_eq!(anchor::validate(&without_tags, &schema), Ok(()));
}

#[test]
fn list_schema_over_object_checks_values() {
    let strings = Ruleset::each(Ruleset::named("string"));
    assert_eq!(anchor::validate(&Datum::object([("a", "x")]), &strings), Ok(()));

    let err = anchor::validate(&Datum::object([("a", 1)]), &strings).unwrap_err();
    assert!(err.is_failure());
    assert_eq!(err.path(), Some("$[\"a\"]"));
}

#[test]
fn structural_markers() {
    let any_array = Ruleset::any_array();
    let any_object = Ruleset::any_object();

    assert!(anchor::is_valid(&Datum::array([1, 2]), &any_array));
    assert!(!anchor::is_valid(&Datum::object([("a", 1)]), &any_array));
    assert!(anchor::is_valid(&Datum::object([("a", 1)]), &any_object));
    assert!(!anchor::is_valid(&Datum::from("a"), &any_object));
    assert!(!anchor::is_valid(&Datum::Null, &any_object));
}

// Pattern rules return the match outcome. A non-matching string is a failure.
#[test]
fn pattern_rule_rejects_non_matching_data() {
    let ruleset = Ruleset::keyed([("tag", Ruleset::pattern("^#[a-z]+$").unwrap())]);
    assert!(anchor::is_valid(&Datum::object([("tag", "#rust")]), &ruleset));

    let err = anchor::validate(&Datum::object([("tag", "rust")]), &ruleset).unwrap_err();
    assert!(err.is_failure());
    assert_eq!(err.path(), Some("$.tag"));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Caller errors and guards
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn depth_guard_trips_regardless_of_data() {
    let ruleset = nested_each(51);

    for data in [
        Datum::array(Vec::<Datum>::new()),
        Datum::from("x"),
        Datum::Undefined,
    ] {
        let err = anchor::validate(&data, &ruleset).unwrap_err();
        assert_eq!(err, ValidationError::DepthExceeded { depth: 51, max: 50 });
    }
}

#[test]
fn depth_at_limit_is_allowed() {
    let ruleset = nested_each(50);
    assert!(anchor::is_valid(&Datum::array(Vec::<Datum>::new()), &ruleset));
}

#[test]
fn malformed_schema_is_rejected_at_construction() {
    let err = Ruleset::from_items(vec![Ruleset::named("string"), Ruleset::named("number")])
        .unwrap_err();
    assert_eq!(err, ValidationError::MalformedSchema { len: 2 });
    assert!(err.is_caller_error());
}

#[test]
fn unknown_rule_is_caller_error() {
    let err = anchor::validate(&Datum::from(1), &Ruleset::named("no_such_rule")).unwrap_err();
    assert!(err.is_caller_error());
    assert!(err.to_string().contains("registered: "));
}

#[test]
fn unknown_rule_is_not_consulted_for_empty_array() {
    let ruleset = Ruleset::each(Ruleset::named("no_such_rule"));
    assert!(anchor::is_valid(&Datum::array(Vec::<Datum>::new()), &ruleset));
}

#[test]
fn predicate_error_surfaces() {
    let ruleset = Ruleset::named_with("after", "not a date");
    let err = anchor::validate(&Datum::from("2020-01-01"), &ruleset).unwrap_err();
    assert_eq!(err.kind(), "predicate_error");
    assert!(!err.is_failure());
}

// ═══════════════════════════════════════════════════════════════════════════════
// Handler contract
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn handler_invoked_once_for_failure() {
    let mut seen = Vec::new();
    let result = anchor::validate_or_else(&Datum::from("not-a-uuid"), &Ruleset::named("uuid"), |e| {
        seen.push(e);
        "handled"
    });

    assert_eq!(result, Err("handled"));
    assert_eq!(seen.len(), 1);
    assert!(seen[0].is_failure());
}

#[test]
fn handler_receives_every_error_kind() {
    let cases = [
        (Datum::from(1), Ruleset::named("no_such_rule"), "unknown_rule"),
        (Datum::array(Vec::<Datum>::new()), nested_each(51), "depth_exceeded"),
        (
            Datum::from("2020-01-01"),
            Ruleset::named_with("before", "never"),
            "predicate_error",
        ),
    ];

    for (data, ruleset, expected) in cases {
        let mut calls = 0;
        let result = anchor::validate_or_else(&data, &ruleset, |e| {
            calls += 1;
            e.kind()
        });
        assert_eq!(result, Err(expected));
        assert_eq!(calls, 1);
    }
}

#[test]
fn handler_not_invoked_on_success() {
    let mut calls = 0;
    let result = anchor::validate_or_else(&Datum::from(5), &Ruleset::named("number"), |_| {
        calls += 1;
    });
    assert_eq!(result, Ok(()));
    assert_eq!(calls, 0);
}

// ═══════════════════════════════════════════════════════════════════════════════
// Custom registries
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn custom_rule_alongside_builtins() {
    let registry = RegistryBuilder::with_builtins()
        .rule_fn("port", |d: &Datum, _: Option<&Datum>| {
            Ok(d.as_number().is_some_and(|n| (1.0..=65535.0).contains(&n) && n.fract() == 0.0))
        })
        .build();
    let validator = Validator::new(registry);

    let ruleset = Ruleset::keyed([
        ("host", Ruleset::named("urlish")),
        ("port", Ruleset::named("port")),
    ]);
    let good = Datum::object([("host", Datum::from("db.internal")), ("port", Datum::from(5432))]);
    let bad = Datum::object([("host", Datum::from("db.internal")), ("port", Datum::from(0))]);

    assert!(validator.is_valid(&good, &ruleset));
    assert_eq!(validator.validate(&bad, &ruleset).unwrap_err().path(), Some("$.port"));
}

#[test]
fn fresh_registry_per_test_is_isolated() {
    let validator = Validator::new(RegistryBuilder::new().build());
    let err = validator
        .validate(&Datum::from("x"), &Ruleset::named("string"))
        .unwrap_err();
    assert!(matches!(err, ValidationError::UnknownRule { ref available, .. } if available.is_empty()));
}
