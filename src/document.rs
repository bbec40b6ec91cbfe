//! Defensive access to the raw metrics document.
//!
//! The document arrives as untyped JSON with every level optional. Lookups
//! return `None` at the first missing level instead of failing.
//!
//! Two numeric policies apply. Stated fields (KPIs, a section's `rating`
//! and `reviews_total`) count only as JSON numbers, see [`finite_number`].
//! Per-SKU rating fields are coerced the way a browser's `Number()` does,
//! see [`coerce_number`].

use serde_json::{Number, Value};

/// Looks up a dot-separated path such as `"wb_metrics.sku_ratings"`.
///
/// Returns `None` if any segment is missing or an intermediate value is not
/// a container. Array segments take a numeric index.
pub fn get_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |acc, key| match acc {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Mutable counterpart of [`get_path`].
pub fn get_path_mut<'a>(doc: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    path.split('.').try_fold(doc, |acc, key| match acc {
        Value::Object(map) => map.get_mut(key),
        Value::Array(items) => key
            .parse::<usize>()
            .ok()
            .and_then(move |i| items.get_mut(i)),
        _ => None,
    })
}

/// Reads a value as a finite number. Only JSON numbers qualify; numeric
/// strings, `null`, booleans and containers are absent.
pub fn finite_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|n| n.is_finite())
}

/// Coerces a value to a number with `Number()` semantics and keeps it only
/// if finite.
///
/// `null`, `""` and `[]` become `0`, booleans become `0`/`1`, strings are
/// parsed after trimming (including `0x`/`0o`/`0b` integers), and a
/// one-element array coerces its element. Objects are absent.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_numeric_str(s)?,
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [single @ (Value::Null | Value::Number(_) | Value::String(_))] => {
                coerce_number(single)?
            }
            _ => return None,
        },
        Value::Object(_) => return None,
    };
    n.is_finite().then_some(n)
}

fn parse_numeric_str(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Some(0.0);
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return None;
            }
            return u64::from_str_radix(digits, radix).ok().map(|v| v as f64);
        }
    }

    s.parse::<f64>().ok()
}

/// Reads `key` of a section as a finite JSON number.
pub fn field_number(section: Option<&Value>, key: &str) -> Option<f64> {
    section.and_then(|s| s.get(key)).and_then(finite_number)
}

/// Converts a number back into JSON, keeping integral values as integers.
pub fn number_value(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}
