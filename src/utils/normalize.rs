//! Total conversions from loosely-typed store records to view-model fields.
//!
//! Nothing in here fails: a missing, `null`, or mistyped value always falls
//! back to a caller-supplied default so view models stay renderable.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::store::Envelope;
use crate::utils::time;

/// Resolves a dotted path (`"candidate.full_name"`, `"skills.0"`) in `record`.
/// `null` at the end of the path counts as missing.
pub fn lookup<'a>(record: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let mut current = record;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        current = match current {
            JsonValue::Object(map) => map.get(segment)?,
            JsonValue::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// Value at `path` deserialized as `T`, or `default` when the path is missing,
/// `null`, or holds something that does not deserialize as `T`.
pub fn safe_get<T: DeserializeOwned>(record: &JsonValue, path: &str, default: T) -> T {
    lookup(record, path)
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or(default)
}

pub fn safe_string(value: Option<&JsonValue>) -> String {
    match value {
        None | Some(JsonValue::Null) => String::new(),
        Some(JsonValue::String(s)) => s.clone(),
        Some(JsonValue::Bool(b)) => b.to_string(),
        Some(JsonValue::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

pub fn safe_now() -> String {
    time::to_rfc3339(time::now())
}

/// First path among `paths` that resolves, coerced to a string.
/// Used where the same field travels under different names.
pub fn first_present(record: &JsonValue, paths: &[&str]) -> String {
    safe_string(paths.iter().find_map(|p| lookup(record, p)))
}

pub fn safe_timestamp(record: &JsonValue, path: &str) -> DateTime<Utc> {
    lookup(record, path)
        .and_then(JsonValue::as_str)
        .and_then(time::parse_timestamp)
        .unwrap_or_else(time::now)
}

pub fn safe_i32(record: &JsonValue, path: &str, default: i32) -> i32 {
    match lookup(record, path) {
        Some(JsonValue::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or(default),
        Some(JsonValue::String(s)) => s.trim().parse().unwrap_or(default),
        _ => default,
    }
}

pub fn safe_decimal(record: &JsonValue, path: &str) -> Decimal {
    let text = match lookup(record, path) {
        Some(JsonValue::Number(n)) => n.to_string(),
        Some(JsonValue::String(s)) => s.trim().to_string(),
        _ => return Decimal::ZERO,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .unwrap_or(Decimal::ZERO)
}

/// Strings from an array at `path`; non-string entries are coerced, blanks and
/// duplicates dropped. A single string is treated as a comma-separated list.
pub fn safe_string_list(record: &JsonValue, path: &str) -> Vec<String> {
    let raw: Vec<String> = match lookup(record, path) {
        Some(JsonValue::Array(items)) => items.iter().map(|v| safe_string(Some(v))).collect(),
        Some(JsonValue::String(s)) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };
    dedup_trimmed(raw)
}

pub fn dedup_trimmed<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out: Vec<String> = Vec::new();
    for value in values {
        let trimmed = value.trim();
        if !trimmed.is_empty() && !out.iter().any(|v| v == trimmed) {
            out.push(trimmed.to_string());
        }
    }
    out
}

pub fn handle_single_response<T>(response: Envelope<T>) -> Option<T> {
    response.data
}

pub fn handle_multiple_response<T>(response: Envelope<Vec<T>>) -> Vec<T> {
    response.data.unwrap_or_default()
}
