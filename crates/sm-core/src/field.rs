//! Field normalization
//!
//! Pure functions that turn a raw cell into a canonical [`Value`] according
//! to the declared [`FieldKind`] of its column.

use crate::value::Value;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Placeholder substituted for absent or blank text
pub const SENTINEL: &str = "UNKNOWN";

const FLAG_YES: &str = "Y";
const FLAG_NO: &str = "N";

/// How a column's raw values are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text: trimmed, uppercased, sentineled when blank
    Text,
    /// Integer key: never uppercased, null when absent or non-numeric
    NumericIdentifier,
    /// Calendar date
    Date,
    /// Integer measure (counts, points)
    Integer,
    /// Fractional measure (prices, amounts), kept to cents
    Decimal,
    /// `Y`/`N` flag; anything else reads as `N`
    Flag,
}

/// Magnitude bound of [`FieldKind::Decimal`] values (`DECIMAL(18,2)`)
pub const DECIMAL_LIMIT: f64 = 1e16;

impl FieldKind {
    /// SQL column type used in the warehouse DDL
    pub fn sql_type(&self) -> &'static str {
        match self {
            FieldKind::Text | FieldKind::Flag => "VARCHAR",
            FieldKind::NumericIdentifier | FieldKind::Integer => "BIGINT",
            FieldKind::Date => "DATE",
            FieldKind::Decimal => "DECIMAL(18,2)",
        }
    }

    /// Text-valued kinds are never NULL in the warehouse
    pub fn is_textual(&self) -> bool {
        matches!(self, FieldKind::Text | FieldKind::Flag)
    }

    /// Value stored for a column the input did not carry
    pub fn absent_value(&self) -> Value {
        match self {
            FieldKind::Text => Value::from(SENTINEL),
            FieldKind::Flag => Value::from(FLAG_NO),
            _ => Value::Null,
        }
    }

    /// Check that a normalized value fits the column type.
    ///
    /// Only decimals can overflow: `BIGINT` holds any `i64`.
    pub fn check_range(&self, value: &Value) -> Result<(), String> {
        match (self, value) {
            (FieldKind::Decimal, Value::Decimal(d)) if d.abs() >= DECIMAL_LIMIT => Err(format!(
                "{} is too large for {}",
                value,
                self.sql_type()
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Text => write!(f, "text"),
            FieldKind::NumericIdentifier => write!(f, "numeric_identifier"),
            FieldKind::Date => write!(f, "date"),
            FieldKind::Integer => write!(f, "integer"),
            FieldKind::Decimal => write!(f, "decimal"),
            FieldKind::Flag => write!(f, "flag"),
        }
    }
}

/// A raw value that could not be converted to its declared kind
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[F001] Cannot parse '{raw}' as {kind}")]
pub struct FieldError {
    /// Declared kind of the column
    pub kind: FieldKind,
    /// The offending raw value (untrimmed)
    pub raw: String,
}

/// Ordered list of `chrono` formats tried when parsing dates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormats(Vec<String>);

/// Formats accepted when the project does not configure its own
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%Y-%m-%d %H:%M:%S",
];

impl DateFormats {
    /// Build from an explicit list of formats, tried in order
    pub fn new(formats: Vec<String>) -> Self {
        Self(formats)
    }

    /// The formats, in the order they are tried
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    fn parse(&self, s: &str) -> Option<NaiveDate> {
        self.0.iter().find_map(|fmt| {
            NaiveDate::parse_from_str(s, fmt)
                .ok()
                .or_else(|| NaiveDateTime::parse_from_str(s, fmt).ok().map(|dt| dt.date()))
        })
    }
}

impl Default for DateFormats {
    fn default() -> Self {
        Self(DEFAULT_DATE_FORMATS.iter().map(|s| s.to_string()).collect())
    }
}

/// Normalize a single raw cell.
///
/// `raw` is `None` when the column is missing from the record entirely.
/// Only [`FieldKind::Date`], [`FieldKind::Integer`] and [`FieldKind::Decimal`]
/// can fail; text and flags never fail and identifiers degrade to null.
/// Decimals are rounded to cents.
///
/// # Examples
/// ```
/// use sm_core::field::{normalize, DateFormats, FieldKind};
/// use sm_core::Value;
///
/// let formats = DateFormats::default();
/// assert_eq!(
///     normalize(Some(" ann "), FieldKind::Text, &formats).unwrap(),
///     Value::Text("ANN".to_string())
/// );
/// assert_eq!(
///     normalize(Some("c-102"), FieldKind::NumericIdentifier, &formats).unwrap(),
///     Value::Null
/// );
/// ```
pub fn normalize(
    raw: Option<&str>,
    kind: FieldKind,
    formats: &DateFormats,
) -> Result<Value, FieldError> {
    let trimmed = raw.map(str::trim).unwrap_or("");

    match kind {
        FieldKind::Text => Ok(normalize_text(trimmed)),
        FieldKind::Flag => Ok(normalize_flag(trimmed)),
        FieldKind::NumericIdentifier => Ok(parse_integer(trimmed).map_or(Value::Null, Value::Integer)),
        FieldKind::Date => {
            if trimmed.is_empty() {
                return Ok(Value::Null);
            }
            formats
                .parse(trimmed)
                .map(Value::Date)
                .ok_or_else(|| malformed(kind, raw))
        }
        FieldKind::Integer => {
            let cleaned = strip_thousands(trimmed);
            if cleaned.is_empty() {
                return Ok(Value::Null);
            }
            parse_integer(&cleaned)
                .map(Value::Integer)
                .ok_or_else(|| malformed(kind, raw))
        }
        FieldKind::Decimal => {
            let cleaned = strip_thousands(trimmed);
            if cleaned.is_empty() {
                return Ok(Value::Null);
            }
            cleaned
                .parse::<f64>()
                .ok()
                .filter(|d| d.is_finite())
                .map(|d| Value::Decimal((d * 100.0).round() / 100.0))
                .ok_or_else(|| malformed(kind, raw))
        }
    }
}

fn normalize_text(trimmed: &str) -> Value {
    if trimmed.is_empty() {
        Value::Text(SENTINEL.to_string())
    } else {
        Value::Text(trimmed.to_uppercase())
    }
}

fn normalize_flag(trimmed: &str) -> Value {
    if trimmed.eq_ignore_ascii_case(FLAG_YES) {
        Value::from(FLAG_YES)
    } else {
        Value::from(FLAG_NO)
    }
}

/// Parse `-?digits`, also accepting a zero fraction such as `"7.0"`.
///
/// Signs other than a leading `-`, exponents and other fractions are
/// rejected, so `"1e3"` and `"+7"` do not parse.
fn parse_integer(s: &str) -> Option<i64> {
    let whole = match s.split_once('.') {
        Some((whole, fraction)) => {
            if fraction.is_empty() || !fraction.bytes().all(|b| b == b'0') {
                return None;
            }
            whole
        }
        None => s,
    };
    let digits = whole.strip_prefix('-').unwrap_or(whole);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    whole.parse::<i64>().ok()
}

fn strip_thousands(s: &str) -> String {
    s.replace(',', "")
}

fn malformed(kind: FieldKind, raw: Option<&str>) -> FieldError {
    FieldError {
        kind,
        raw: raw.unwrap_or_default().to_string(),
    }
}

#[cfg(test)]
#[path = "field_test.rs"]
mod tests;
