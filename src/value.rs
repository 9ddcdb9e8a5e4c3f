use std::cmp::Ordering;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, prelude::FromPrimitive};

/// A dynamically typed scalar stored in a row.
///
/// Every value has a canonical string form (see [`Value::as_string`]) which is
/// what equality, grouping keys and the lexicographic sort fallback operate
/// on. Values that look like numbers additionally have a numeric form used by
/// the ordering operators and by numeric sorting.
///
/// # Examples
///
/// ```
/// use tabql::Value;
///
/// assert_eq!(Value::Float(1.23).as_string(), "1.23");
/// assert_eq!(Value::Float(3.0).as_string(), "3");
/// assert_eq!(Value::Null.as_string(), "");
/// assert!(Value::String("42".into()).as_decimal().is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent / SQL null
    Null,

    /// Boolean (true/false)
    Boolean(bool),

    /// Integer number
    Integer(i64),

    /// Floating-point number
    Float(f64),

    /// UTF-8 string
    String(String),

    /// Raw bytes, usually text coming from a driver
    Bytes(Vec<u8>),

    /// Date and time without a zone
    Timestamp(NaiveDateTime),
}

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl Value {
    /// Canonical string form.
    pub fn as_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            Value::Timestamp(ts) => {
                let rendered = ts.format(TIMESTAMP_FORMAT).to_string();
                match rendered.strip_suffix(" 00:00:00") {
                    Some(date) => date.to_string(),
                    None => rendered,
                }
            }
        }
    }

    /// Numeric form, if the value is a number or a string holding one.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Integer(n) => Some(Decimal::from(*n)),
            // Shortest round-trip text keeps 1.23 as 1.23 instead of the
            // nearest binary fraction.
            Value::Float(n) => parse_decimal(&n.to_string()).or_else(|| Decimal::from_f64(*n)),
            Value::String(s) => parse_decimal(s),
            Value::Bytes(b) => std::str::from_utf8(b).ok().and_then(parse_decimal),
            _ => None,
        }
    }

    /// Finite floating point form, used when a number is too large for
    /// [`Decimal`].
    pub fn as_float(&self) -> Option<f64> {
        let n = match self {
            Value::Integer(n) => *n as f64,
            Value::Float(n) => *n,
            Value::String(s) => s.parse::<f64>().ok()?,
            Value::Bytes(b) => std::str::from_utf8(b).ok()?.parse::<f64>().ok()?,
            _ => return None,
        };
        n.is_finite().then_some(n)
    }

    /// Compare two values numerically. Returns `None` unless both sides have a
    /// numeric form.
    pub fn numeric_cmp(&self, other: &Value) -> Option<Ordering> {
        if let (Some(a), Some(b)) = (self.as_decimal(), other.as_decimal()) {
            return Some(a.cmp(&b));
        }
        match (self.as_float(), other.as_float()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        }
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(ts: NaiveDateTime) -> Self {
        Value::Timestamp(ts)
    }
}

#[test]
fn test_timestamp_strips_midnight() {
    use chrono::NaiveDate;

    let midnight = NaiveDate::from_ymd_opt(2020, 12, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap();
    assert_eq!(Value::Timestamp(midnight).as_string(), "2020-12-01");

    let afternoon = NaiveDate::from_ymd_opt(2020, 12, 1)
        .and_then(|d| d.and_hms_opt(15, 4, 5))
        .unwrap();
    assert_eq!(Value::Timestamp(afternoon).as_string(), "2020-12-01 15:04:05");
}

#[test]
fn test_numeric_cmp_mixed_types() {
    assert_eq!(
        Value::Integer(3).numeric_cmp(&Value::String("2.5".into())),
        Some(Ordering::Greater)
    );
    assert_eq!(
        Value::Float(1.23).numeric_cmp(&Value::String("1.23".into())),
        Some(Ordering::Equal)
    );
    assert_eq!(Value::String("abc".into()).numeric_cmp(&Value::Integer(1)), None);
    assert_eq!(Value::Null.numeric_cmp(&Value::Integer(1)), None);
}
