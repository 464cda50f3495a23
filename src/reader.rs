//! Lenient parse entry points.
//!
//! Everything here is a thin wrapper over [`parse`](crate::parse) for
//! callers that treat malformed input as absent data instead of a hard
//! failure. The core parser itself never downgrades an error; the
//! substitution happens only in this module.

use std::collections::HashMap;

use crate::parser::parse;
use crate::value::Value;

/// Parse text whose root must be an object or an array; `None` on any
/// failure, including a scalar root.
pub fn read(input: &str) -> Option<Value> {
    let trimmed = input.trim();
    let object_like = trimmed.starts_with('{') && trimmed.ends_with('}');
    let array_like = trimmed.starts_with('[') && trimmed.ends_with(']');
    if !object_like && !array_like {
        return None;
    }
    parse(trimmed).ok()
}

/// Like [`read`], but substitutes an empty object for failure.
pub fn read_or_empty(input: &str) -> Value {
    read(input).unwrap_or_else(|| Value::Object(HashMap::new()))
}

/// Parse text as an array; `None` on failure or a non-array root.
pub fn read_array(input: &str) -> Option<Vec<Value>> {
    match parse(input) {
        Ok(Value::Array(items)) => Some(items),
        _ => None,
    }
}

/// Like [`read_array`], but substitutes an empty array for failure.
pub fn read_array_or_empty(input: &str) -> Vec<Value> {
    read_array(input).unwrap_or_default()
}

/// Parse text as an object; `None` on failure or a non-object root.
pub fn read_object(input: &str) -> Option<HashMap<String, Value>> {
    match parse(input) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Like [`read_object`], but substitutes an empty object for failure.
pub fn read_object_or_empty(input: &str) -> HashMap<String, Value> {
    read_object(input).unwrap_or_default()
}
