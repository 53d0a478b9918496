//! anchor CLI — validate a data document against a ruleset document.
//!
//! Subcommands:
//! - `check <ruleset> <data> [--max-depth N]` — validate data against a ruleset
//! - `rules` — print the built-in rule names
//!
//! Documents ending in `.json` are read as JSON, anything else as YAML.
//! Log output goes to stderr and is filtered by `ANCHOR_LOG` (default `warn`).

use std::path::Path;
use std::process;

use anchor::{Datum, Registry, Ruleset, Validator, DEFAULT_MAX_DEPTH};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "ANCHOR_LOG";

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "check" => cmd_check(&args[2..]),
        "rules" => cmd_rules(),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("error: unknown command \"{other}\"");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_check(args: &[String]) -> Result<(), String> {
    let opts = parse_check_args(args)?;

    let ruleset = load_ruleset(&opts.ruleset)?;
    let data = load_data(&opts.data)?;
    let validator = Validator::default().with_max_depth(opts.max_depth);

    tracing::debug!(ruleset = %opts.ruleset, data = %opts.data, "checking");
    validator.validate(&data, &ruleset).map_err(|e| {
        if e.is_failure() {
            format!("invalid: {e}")
        } else {
            format!("validation aborted: {e}")
        }
    })?;

    println!("valid");
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Uniform return type for all commands
fn cmd_rules() -> Result<(), String> {
    let registry: &Registry = Validator::global().registry();

    println!("Built-in rules:");
    for name in registry.rule_names() {
        println!("  {name}");
    }

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Document loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_document(path: &str) -> Result<Value, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;

    let is_json = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).map_err(|e| format!("JSON parse error in \"{path}\": {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(&content).map_err(|e| format!("YAML parse error in \"{path}\": {e}"))
    }
}

fn load_ruleset(path: &str) -> Result<Ruleset, String> {
    let document = load_document(path)?;
    Ruleset::from_json(&document).map_err(|e| format!("ruleset invalid: {e}"))
}

fn load_data(path: &str) -> Result<Datum, String> {
    load_document(path).map(Datum::from)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Argument parsing
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, PartialEq, Eq)]
struct CheckArgs {
    ruleset: String,
    data: String,
    max_depth: usize,
}

fn parse_check_args(args: &[String]) -> Result<CheckArgs, String> {
    let mut paths = Vec::new();
    let mut max_depth = DEFAULT_MAX_DEPTH;
    let mut i = 0;

    while i < args.len() {
        if args[i] == "--max-depth" {
            i += 1;
            let raw = args.get(i).ok_or("--max-depth requires a value")?;
            max_depth = raw
                .parse()
                .map_err(|_| format!("invalid --max-depth \"{raw}\", expected a whole number"))?;
        } else if args[i].starts_with("--") {
            return Err(format!("unexpected argument \"{}\"", args[i]));
        } else {
            paths.push(args[i].clone());
        }
        i += 1;
    }

    match <[String; 2]>::try_from(paths) {
        Ok([ruleset, data]) => Ok(CheckArgs {
            ruleset,
            data,
            max_depth,
        }),
        Err(_) => Err("check requires a ruleset path and a data path".into()),
    }
}

fn print_usage() {
    eprintln!(
        "Usage: anchor <command> [options]

Commands:
  check <ruleset> <data> [--max-depth N]   Validate data against a ruleset
  rules                                    Print the built-in rule names
  help                                     Show this help

Environment:
  {LOG_ENV}    Log filter (default: warn)"
    );
}
