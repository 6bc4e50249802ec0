//! The JSON envelope every reply arrives in, and the shapes inside it.

use serde::Deserialize;
use serde_json::Value;

use crate::error::DecodeError;
use crate::objects::{LxAggregate, LxLocation};
use crate::util::lenient;

/// Status string the server uses for a successful call.
pub const SUCCESS: &str = "Success";

/// A decoded reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<T> {
    /// HTTP status code.
    pub status: u16,
    /// The server's `Status` string (`Success` for anything returned here).
    pub message: String,
    /// Server-side execution time in seconds, when reported.
    pub execution_time: Option<f64>,
    /// Raw response body.
    pub body: String,
    pub data: T,
}

impl<T> Response<T> {
    pub fn into_data(self) -> T {
        self.data
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response {
            status: self.status,
            message: self.message,
            execution_time: self.execution_time,
            body: self.body,
            data: f(self.data),
        }
    }
}

/// One page of a listing, search or analytics call.
///
/// A page carries either rows or an aggregate, never both.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub aggregate: Option<LxAggregate>,
    /// Cursor for the following page; `None` on the last one.
    pub next_key: Option<String>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            aggregate: None,
            next_key: None,
        }
    }
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.aggregate.is_none()
    }

    pub fn is_last(&self) -> bool {
        self.next_key.is_none()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Envelope {
    pub(crate) status: String,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub(crate) execution_time: Option<f64>,
    #[serde(default)]
    pub(crate) result: Option<Value>,
}

impl Envelope {
    pub(crate) fn parse(body: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(body)?)
    }
}

pub(crate) fn required(result: Option<&Value>) -> Result<&Value, DecodeError> {
    match result {
        None | Some(Value::Null) => Err(DecodeError::MissingResult),
        Some(v) => Ok(v),
    }
}

/// A named member of the `Result` object.
pub(crate) fn member<'a>(result: Option<&'a Value>, name: &str) -> Result<&'a Value, DecodeError> {
    match required(result)?.get(name) {
        None | Some(Value::Null) => Err(DecodeError::invalid(format!(
            "result has no `{name}` member"
        ))),
        Some(v) => Ok(v),
    }
}

fn next_key(result: &Value) -> Option<String> {
    match result.get("NextKey") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Decodes a paged result whose rows live under `rows_field`.
///
/// Aggregates take precedence: when any aggregate member is present the
/// rows are not read at all.
pub(crate) fn page<T>(
    result: Option<&Value>,
    rows_field: &str,
    decode_row: impl Fn(&Value) -> Result<T, DecodeError>,
) -> Result<Page<T>, DecodeError> {
    let result = required(result)?;
    let next_key = next_key(result);

    if let Some(aggregate) = LxAggregate::decode(result)? {
        return Ok(Page {
            rows: Vec::new(),
            aggregate: Some(aggregate),
            next_key,
        });
    }

    let rows = match result.get(rows_field) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(decode_row).collect::<Result<_, _>>()?,
        Some(other) => {
            return Err(DecodeError::invalid(format!(
                "`{rows_field}` is not an array: {other}"
            )));
        }
    };

    Ok(Page {
        rows,
        aggregate: None,
        next_key,
    })
}

/// History rows come under `Locations` on current servers and `Objects` on
/// older ones.
pub(crate) fn location_history(result: Option<&Value>) -> Result<Page<LxLocation>, DecodeError> {
    let field = match required(result)?.get("Locations") {
        Some(_) => "Locations",
        None => "Objects",
    };
    page(result, field, LxLocation::decode)
}
