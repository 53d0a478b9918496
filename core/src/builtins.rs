//! Built-in rules.
//!
//! Each rule is a plain function registered under one or more names by
//! [`register_builtins`]. Kind checks (`string`, `number`, ...) look at the
//! datum's variant. Format checks (`email`, `int`, ...) look at the datum's
//! string form ([`Datum::coerce_str`]), so `30` and `"30"` are both `int`.

use crate::{Datum, Pattern, PredicateError, RegistryBuilder};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::net::IpAddr;
use std::sync::LazyLock;

type RuleResult = Result<bool, PredicateError>;

static EMAIL_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email regex is valid")
});

static URL_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"^(?:(?:https?|ftp)://)?(?:[^\s:@/]+(?::[^\s:@/]*)?@)?(?:localhost|(?:\d{1,3}\.){3}\d{1,3}|(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,})(?::\d{2,5})?(?:[/?#]\S*)?$",
    )
    .expect("url regex is valid")
});

static CREDIT_CARD_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"^(?:4[0-9]{12}(?:[0-9]{3})?|5[1-5][0-9]{14}|6(?:011|5[0-9]{2})[0-9]{12}|3[47][0-9]{13}|3(?:0[0-5]|[68][0-9])[0-9]{11}|(?:2131|1800|35[0-9]{3})[0-9]{11})$",
    )
    .expect("credit card regex is valid")
});

static DECIMAL_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^-?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$")
        .expect("decimal regex is valid")
});

/// Loose host-looking strings: something dotted, surrounding whitespace allowed.
const URLISH_PATTERN: &str = r"^\s*(?:[^/]+\.)+.+\s*$";

/// URLs longer than this are rejected outright.
const MAX_URL_LENGTH: usize = 2083;

/// Register the built-in rules.
///
/// Call this before adding custom rules so a custom rule may deliberately
/// replace a built-in of the same name.
///
/// # Example
///
/// ```
/// use anchor::{register_builtins, RegistryBuilder};
///
/// let registry = register_builtins(RegistryBuilder::new()).build();
/// assert!(registry.contains("email"));
/// assert!(registry.contains("integer"));
/// ```
#[must_use]
pub fn register_builtins(builder: RegistryBuilder) -> RegistryBuilder {
    let builder = builder
        // presence
        .rule_fn("empty", is_empty)
        .rule_fn("undefined", is_undefined)
        .rule_fn("null", is_null)
        // kinds
        .rule_fn("string", is_string)
        .rule_fn("number", is_number)
        .rule_fn("finite", is_finite)
        .rule_fn("boolean", is_boolean)
        .rule_fn("array", is_array)
        .rule_fn("date", is_date)
        // string formats
        .rule_fn("alpha", is_alpha)
        .rule_fn("numeric", is_numeric)
        .rule_fn("alphanumeric", is_alphanumeric)
        .rule_fn("email", is_email)
        .rule_fn("url", is_url)
        .rule_fn("ip", is_ip)
        .rule_fn("creditcard", is_credit_card)
        .rule_fn("uuid", is_uuid)
        // numeric formats
        .rule_fn("int", is_int)
        .rule_fn("integer", is_int)
        .rule_fn("decimal", is_decimal)
        .rule_fn("float", is_decimal)
        // truthiness
        .rule_fn("truthy", is_truthy)
        .rule_fn("falsey", is_falsey)
        // dates
        .rule_fn("after", is_after)
        .rule_fn("before", is_before);

    match Pattern::new(URLISH_PATTERN) {
        Ok(pattern) => builder.pattern("urlish", pattern),
        Err(e) => {
            tracing::warn!(error = %e, "urlish pattern failed to compile; rule not registered");
            builder
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Presence and kinds
// ═══════════════════════════════════════════════════════════════════════════════

fn is_empty(d: &Datum, _: Option<&Datum>) -> RuleResult {
    Ok(d.as_str() == Some(""))
}

fn is_undefined(d: &Datum, _: Option<&Datum>) -> RuleResult {
    Ok(d.is_undefined())
}

fn is_null(d: &Datum, _: Option<&Datum>) -> RuleResult {
    Ok(d.is_null())
}

fn is_string(d: &Datum, _: Option<&Datum>) -> RuleResult {
    Ok(d.is_string())
}

/// Any number, `NaN` and infinities included.
fn is_number(d: &Datum, _: Option<&Datum>) -> RuleResult {
    Ok(d.is_number())
}

/// Finite numbers, and strings that read as one (`"5"`, `" 1e3 "`).
fn is_finite(d: &Datum, _: Option<&Datum>) -> RuleResult {
    Ok(match d {
        Datum::Number(n) => n.is_finite(),
        Datum::String(s) => s.trim().parse::<f64>().is_ok_and(f64::is_finite),
        _ => false,
    })
}

fn is_boolean(d: &Datum, _: Option<&Datum>) -> RuleResult {
    Ok(d.is_bool())
}

fn is_array(d: &Datum, _: Option<&Datum>) -> RuleResult {
    Ok(d.is_array())
}

fn is_date(d: &Datum, _: Option<&Datum>) -> RuleResult {
    Ok(d.is_date())
}

fn is_truthy(d: &Datum, _: Option<&Datum>) -> RuleResult {
    Ok(d.is_truthy())
}

fn is_falsey(d: &Datum, _: Option<&Datum>) -> RuleResult {
    Ok(!d.is_truthy())
}

// ═══════════════════════════════════════════════════════════════════════════════
// String formats
// ═══════════════════════════════════════════════════════════════════════════════

fn is_alpha(d: &Datum, _: Option<&Datum>) -> RuleResult {
    let s = d.coerce_str();
    Ok(!s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()))
}

fn is_numeric(d: &Datum, _: Option<&Datum>) -> RuleResult {
    let s = d.coerce_str();
    let digits = s.strip_prefix('-').unwrap_or(&s);
    Ok(!digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
}

fn is_alphanumeric(d: &Datum, _: Option<&Datum>) -> RuleResult {
    let s = d.coerce_str();
    Ok(!s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()))
}

fn is_email(d: &Datum, _: Option<&Datum>) -> RuleResult {
    Ok(EMAIL_REGEX.is_match(&d.coerce_str()))
}

fn is_url(d: &Datum, _: Option<&Datum>) -> RuleResult {
    let s = d.coerce_str();
    Ok(s.len() <= MAX_URL_LENGTH && URL_REGEX.is_match(&s))
}

fn is_ip(d: &Datum, _: Option<&Datum>) -> RuleResult {
    Ok(d.coerce_str().parse::<IpAddr>().is_ok())
}

/// Known card number layouts, separators ignored, Luhn checksum enforced.
fn is_credit_card(d: &Datum, _: Option<&Datum>) -> RuleResult {
    let digits: String = d.coerce_str().chars().filter(char::is_ascii_digit).collect();
    Ok(CREDIT_CARD_REGEX.is_match(&digits) && luhn(&digits))
}

fn luhn(digits: &str) -> bool {
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let n = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = n * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                n
            }
        })
        .sum();
    sum % 10 == 0
}

/// Hyphenated UUID. The optional argument selects a version (`1`..=`8`) or
/// `"all"`; a specific version also requires the RFC 4122 variant.
fn is_uuid(d: &Datum, version: Option<&Datum>) -> RuleResult {
    let wanted = uuid_version(version)?;
    let s = d.coerce_str();

    let hyphenated = s.len() == 36
        && s.char_indices()
            .all(|(i, c)| matches!(i, 8 | 13 | 18 | 23) == (c == '-'));
    if !hyphenated {
        return Ok(false);
    }

    let Ok(parsed) = uuid::Uuid::try_parse(&s) else {
        return Ok(false);
    };

    Ok(match wanted {
        None => true,
        Some(v) => {
            parsed.get_version_num() == v && parsed.get_variant() == uuid::Variant::RFC4122
        }
    })
}

fn uuid_version(arg: Option<&Datum>) -> Result<Option<usize>, PredicateError> {
    let Some(arg) = arg else {
        return Ok(None);
    };
    let raw = arg.coerce_str();
    if raw.eq_ignore_ascii_case("all") || raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<usize>() {
        Ok(v) if (1..=8).contains(&v) => Ok(Some(v)),
        _ => Err(PredicateError::new(format!(
            "unsupported uuid version {arg}, expected 1-8 or \"all\""
        ))),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Numeric formats
// ═══════════════════════════════════════════════════════════════════════════════

/// Optional minus sign, then `0` or digits without a leading zero.
fn is_int(d: &Datum, _: Option<&Datum>) -> RuleResult {
    let s = d.coerce_str();
    let digits = s.strip_prefix('-').unwrap_or(&s);
    Ok(match digits.as_bytes() {
        [] => false,
        [b'0'] => true,
        [b'0', ..] => false,
        bytes => bytes.iter().all(u8::is_ascii_digit),
    })
}

fn is_decimal(d: &Datum, _: Option<&Datum>) -> RuleResult {
    Ok(DECIMAL_REGEX.is_match(&d.coerce_str()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Dates
// ═══════════════════════════════════════════════════════════════════════════════

fn is_after(d: &Datum, date: Option<&Datum>) -> RuleResult {
    let comparison = comparison_date(date)?;
    Ok(to_date(d).is_some_and(|value| value > comparison))
}

fn is_before(d: &Datum, date: Option<&Datum>) -> RuleResult {
    let comparison = comparison_date(date)?;
    Ok(to_date(d).is_some_and(|value| value < comparison))
}

/// The comparison argument, defaulting to now. An argument that is present
/// but not a date is an error, not a failed check.
fn comparison_date(arg: Option<&Datum>) -> Result<DateTime<Utc>, PredicateError> {
    match arg {
        None | Some(Datum::Undefined) => Ok(Utc::now()),
        Some(arg) => to_date(arg)
            .ok_or_else(|| PredicateError::new(format!("invalid comparison date {arg}"))),
    }
}

/// Dates, epoch milliseconds, RFC 3339 strings, `YYYY-MM-DD[ HH:MM:SS]`.
fn to_date(d: &Datum) -> Option<DateTime<Utc>> {
    match d {
        Datum::Date(date) => Some(*date),
        Datum::Number(ms) if ms.is_finite() => {
            #[allow(clippy::cast_possible_truncation)] // Sub-millisecond precision is dropped
            DateTime::from_timestamp_millis(*ms as i64)
        }
        Datum::String(s) => parse_date_str(s.trim()),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
