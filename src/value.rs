//! Scalar value inference for querystring values.
//!
//! Querystrings carry only text, so every value is written through
//! [`encode_scalar`] and read back through [`decode_scalar`], which guesses
//! the most specific type the text can represent.

use std::borrow::Cow;

use serde_json::Number;

use crate::ser::encode::encode;

/// A dynamically typed value: filter values and optional parameters.
pub type Value = serde_json::Value;

/// An insertion-ordered string-keyed map of [`Value`]s.
pub type Map = serde_json::Map<String, Value>;

/// Writes a value in its querystring form.
///
/// `null` and booleans are written as their literals; numbers are formatted
/// without a trailing `.0` when integral; everything else is percent-encoded.
pub fn encode_scalar(value: &Value, use_form_encoding: bool) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed("null"),
        Value::Bool(true) => Cow::Borrowed("true"),
        Value::Bool(false) => Cow::Borrowed("false"),
        Value::Number(n) => Cow::Owned(format_number(n)),
        Value::String(s) => encode(s, use_form_encoding),
        // composites have no scalar form; fall back to their JSON text
        other => Cow::Owned(encode(&other.to_string(), use_form_encoding).into_owned()),
    }
}

/// Reads a decoded querystring value, inferring its type.
///
/// `"null"` becomes `null`, `"true"`/`"false"` become booleans, text that
/// (once trimmed) is entirely a finite number becomes a number, and anything
/// else is returned as a string.
pub fn decode_scalar(s: &str) -> Value {
    match s {
        "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => match parse_number(s.trim()) {
            Some(n) => Value::Number(n),
            None => Value::String(s.to_owned()),
        },
    }
}

/// Rewrites integral floats (in `i64` range) as integers, recursively.
///
/// This is the form [`decode_scalar`] reads numbers back in, so `3.0` and
/// `3` become the same value before they are compared or stored.
pub fn normalize_value(value: Value) -> Value {
    match value {
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) => Value::Number(integral_or_float(f)),
            None => Value::Number(n),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, normalize_value(value)))
                .collect(),
        ),
        other => other,
    }
}

fn parse_number(s: &str) -> Option<Number> {
    if s.is_empty() {
        return None;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::from(i));
    }
    if let Ok(u) = s.parse::<u64>() {
        return Some(Number::from(u));
    }
    let f = s.parse::<f64>().ok().filter(|f| f.is_finite())?;
    Some(integral_or_float(f))
}

// i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
const I64_RANGE: std::ops::Range<f64> = -9_223_372_036_854_775_808.0..9_223_372_036_854_775_808.0;

fn integral_or_float(f: f64) -> Number {
    if f.fract() == 0.0 && I64_RANGE.contains(&f) {
        Number::from(f as i64)
    } else {
        // finite by construction
        Number::from_f64(f).unwrap_or_else(|| Number::from(0))
    }
}

fn format_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        itoa::Buffer::new().format(i).to_owned()
    } else if let Some(u) = n.as_u64() {
        itoa::Buffer::new().format(u).to_owned()
    } else {
        let f = n.as_f64().unwrap_or_default();
        if f.fract() == 0.0 && I64_RANGE.contains(&f) {
            itoa::Buffer::new().format(f as i64).to_owned()
        } else {
            ryu::Buffer::new().format_finite(f).to_owned()
        }
    }
}
