use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::DecodeError;

/// Percent-encodes one path segment (feed names and ids may contain anything).
pub(crate) fn escape_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

pub(crate) fn urljoin(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Renders a JSON scalar the way the server's name/value pairs expect.
pub(crate) fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Reads a number that the server may send either bare or as a string.
pub(crate) fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }
}

pub(crate) fn require<'a>(object: &'a Value, name: &str) -> Result<&'a Value, DecodeError> {
    match object.get(name) {
        Some(Value::Null) | None => Err(DecodeError::invalid(format!("missing field `{name}`"))),
        Some(v) => Ok(v),
    }
}

pub(crate) fn require_f64(object: &Value, name: &str) -> Result<f64, DecodeError> {
    let v = require(object, name)?;
    value_as_f64(v).ok_or_else(|| DecodeError::invalid(format!("field `{name}` is not a number: {v}")))
}

pub(crate) fn require_str<'a>(object: &'a Value, name: &str) -> Result<&'a str, DecodeError> {
    let v = require(object, name)?;
    v.as_str()
        .ok_or_else(|| DecodeError::invalid(format!("field `{name}` is not a string: {v}")))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient {
    Number(f64),
    Text(String),
}

/// `deserialize_with` helpers for numeric fields.
pub(crate) mod lenient {
    use super::*;

    pub(crate) fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        match Option::<Lenient>::deserialize(d)? {
            None => Ok(None),
            Some(Lenient::Number(n)) => Ok(Some(n)),
            Some(Lenient::Text(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("expected a number, got `{s}`"))),
        }
    }
}
