//! Shared data types for list requests and responses.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{Error, Result};

/// Flat query parameters sent with a list request.
pub type QueryParams = BTreeMap<String, String>;

/// A single flat record as returned by a list endpoint.
pub type Record = serde_json::Map<String, Value>;

/// Build a `QueryParams` map from string pairs.
pub fn params<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Render params as an url-encoded query string (`a=1&b=x%20y`).
pub fn encode_query(params: &QueryParams) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Format a half-open range as the backend `limit` parameter.
pub fn format_limit(start: usize, end: usize) -> String {
    format!("{},{}", start, end)
}

/// Interpret a response body as a list of flat records.
///
/// Array elements that are not objects are rejected rather than skipped,
/// since the loader tags every element with its position.
pub fn parse_records(module: &str, body: Value) -> Result<Vec<Record>> {
    match body {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(map) => Ok(map),
                other => Err(Error::invalid_response(
                    module,
                    format!("element {} is not an object: {}", i, other),
                )),
            })
            .collect(),
        // Some endpoints wrap the list in {"data": [...]}
        Value::Object(mut map) if map.get("data").is_some_and(Value::is_array) => {
            let data = map.remove("data").unwrap_or(Value::Null);
            parse_records(module, data)
        }
        other => Err(Error::invalid_response(
            module,
            format!("expected a JSON array, got {}", type_name(&other)),
        )),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
