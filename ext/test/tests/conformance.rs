//! Conformance tests that run YAML fixtures against anchor
//!
//! Run with: cargo test -p anchor-test --test conformance
//!
//! Note: This test file requires the `fixtures` feature (on by default).

#![cfg(feature = "fixtures")]

use anchor_test::fixture::Fixture;
use std::fs;
use std::path::{Path, PathBuf};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Load and run every fixture in one file
fn run_fixture_file(name: &str) {
    let path = fixtures_dir().join(name);
    let yaml = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));

    // Parse potentially multiple fixtures (separated by ---)
    let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
        panic!("Failed to parse {}: {e}", path.display());
    });
    assert!(!fixtures.is_empty(), "{} holds no fixtures", path.display());

    for fixture in fixtures {
        println!("  Running: {}", fixture.name);
        fixture.run_and_assert();
    }
}

#[test]
fn test_builtin_rules() {
    run_fixture_file("01_builtin_rules.yaml");
}

#[test]
fn test_schemas() {
    run_fixture_file("02_schemas.yaml");
}

#[test]
fn test_errors() {
    run_fixture_file("03_errors.yaml");
}

#[test]
fn test_custom_rules() {
    run_fixture_file("04_custom_rules.yaml");
}

#[test]
fn every_fixture_file_is_covered() {
    let mut files: Vec<String> = fs::read_dir(fixtures_dir())
        .expect("read fixtures dir")
        .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".yaml") || name.ends_with(".yml"))
        .collect();
    files.sort();
    assert_eq!(
        files,
        [
            "01_builtin_rules.yaml",
            "02_schemas.yaml",
            "03_errors.yaml",
            "04_custom_rules.yaml"
        ]
    );
}
