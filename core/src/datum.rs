//! `Datum` — The value under validation
//!
//! A JSON-like value extended with the two things a structural validator needs
//! to tell apart: an absent value ([`Datum::Undefined`], what a missing key
//! resolves to) and a native timestamp ([`Datum::Date`]).
//!
//! Rules never mutate a `Datum`. Format checks read it through
//! [`Datum::coerce_str`], which renders scalars the way a string-based
//! validator sees them without touching the caller's data.

use chrono::{DateTime, SecondsFormat, Utc};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

static UNDEFINED: Datum = Datum::Undefined;

/// A value to be validated.
///
/// # Example
///
/// ```
/// use anchor::Datum;
///
/// let user = Datum::object([("name", Datum::from("Al")), ("age", Datum::from(30))]);
/// assert_eq!(user.get("name").as_str(), Some("Al"));
/// assert!(user.get("email").is_undefined());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Datum {
    /// No value at all (a missing key, an omitted argument).
    #[default]
    Undefined,

    /// An explicit null.
    Null,

    /// Boolean value.
    Bool(bool),

    /// Numeric value. Integers and floats share one representation.
    Number(f64),

    /// String value.
    String(String),

    /// A point in time.
    Date(DateTime<Utc>),

    /// Ordered sequence of values.
    Array(Vec<Datum>),

    /// String-keyed map of values.
    Object(BTreeMap<String, Datum>),
}

impl Datum {
    /// Build an [`Datum::Object`] from key/value pairs.
    pub fn object<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Datum>,
    {
        Self::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build an [`Datum::Array`] from items.
    pub fn array<V: Into<Datum>>(items: impl IntoIterator<Item = V>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }

    #[inline]
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[inline]
    #[must_use]
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(_))
    }

    #[inline]
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    #[inline]
    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    #[inline]
    #[must_use]
    pub fn is_date(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    #[inline]
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Returns `true` for maps.
    #[inline]
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Try to get the value as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Try to get the value as a number.
    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the value as an array slice.
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&[Datum]> {
        match self {
            Self::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Try to get the value as a map.
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&BTreeMap<String, Datum>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up `key`, yielding [`Datum::Undefined`] when there is nothing there.
    ///
    /// Objects are looked up by key, arrays by a decimal index. Every other
    /// value has no members.
    #[must_use]
    pub fn get(&self, key: &str) -> &Datum {
        let found = match self {
            Self::Object(map) => map.get(key),
            Self::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        found.unwrap_or(&UNDEFINED)
    }

    /// Truthiness: `undefined`, `null`, `false`, `0`, `NaN` and `""` are falsey.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::Date(_) | Self::Array(_) | Self::Object(_) => true,
        }
    }

    /// Returns a string describing the type of this value.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Date(_) => "date",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// The string a format check sees for this value.
    ///
    /// Absent values, `null` and `NaN` read as the empty string; numbers use
    /// their shortest decimal form (`30`, not `30.0`); arrays join their
    /// elements with commas.
    ///
    /// ```
    /// use anchor::Datum;
    ///
    /// assert_eq!(Datum::from(30).coerce_str(), "30");
    /// assert_eq!(Datum::Undefined.coerce_str(), "");
    /// assert_eq!(Datum::array([1, 2]).coerce_str(), "1,2");
    /// ```
    #[must_use]
    pub fn coerce_str(&self) -> Cow<'_, str> {
        match self {
            Self::Undefined | Self::Null => Cow::Borrowed(""),
            Self::Number(n) if n.is_nan() => Cow::Borrowed(""),
            Self::Number(n) => Cow::Owned(format_number(*n)),
            Self::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            Self::String(s) => Cow::Borrowed(s),
            Self::Date(d) => Cow::Owned(format_date(d)),
            Self::Array(items) => Cow::Owned(
                items
                    .iter()
                    .map(|item| item.coerce_str().into_owned())
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            Self::Object(_) => Cow::Borrowed("[object Object]"),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if n == 0.0 {
        // -0 renders as 0
        "0".to_owned()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        exponent_form(n)
    } else {
        format!("{n}")
    }
}

/// `1e21` → `1e+21`, `1.5e-7` → `1.5e-7`.
fn exponent_form(n: f64) -> String {
    let rendered = format!("{n:e}");
    match rendered.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => rendered,
    }
}

fn format_date(d: &DateTime<Utc>) -> String {
    d.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Diagnostic rendering used in error messages: strings are quoted, absent
/// values print as `undefined`.
impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::String(s) => write!(f, "\"{}\"", s.escape_debug()),
            Self::Date(d) => f.write_str(&format_date(d)),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Object(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "\"{}\": {v}", k.escape_debug())?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<String> for Datum {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Datum {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<bool> for Datum {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Datum {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<f32> for Datum {
    fn from(n: f32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i32> for Datum {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for Datum {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i64> for Datum {
    #[allow(clippy::cast_precision_loss)] // Numbers are f64, like the values they model
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<u64> for Datum {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: u64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<DateTime<Utc>> for Datum {
    fn from(d: DateTime<Utc>) -> Self {
        Self::Date(d)
    }
}

impl<T: Into<Datum>> From<Vec<T>> for Datum {
    fn from(items: Vec<T>) -> Self {
        Self::array(items)
    }
}

impl From<BTreeMap<String, Datum>> for Datum {
    fn from(map: BTreeMap<String, Datum>) -> Self {
        Self::Object(map)
    }
}

impl<T> From<Option<T>> for Datum
where
    T: Into<Datum>,
{
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Undefined, Into::into)
    }
}

impl<T: Into<Datum>> FromIterator<T> for Datum {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::array(iter)
    }
}
