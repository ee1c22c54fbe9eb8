//! Reads and writes against a `serde_json::Value` tree

use serde_json::{Map, Value};

use super::segments::{parse, Segment};
use super::FieldPathError;

/// Human-readable name of a value's variant, used in error messages
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Read the value at `path`
///
/// # Errors
///
/// Returns `NotFound` / `IndexOutOfBounds` when a segment is missing, and
/// `NotAContainer` when a segment steps into a scalar.
pub fn get_value<'v>(tree: &'v Value, path: &str) -> Result<&'v Value, FieldPathError> {
    let segments = parse(path)?;
    let mut current = tree;
    for segment in &segments {
        current = match (segment, current) {
            (Segment::Field(name), Value::Object(map)) => {
                map.get(name).ok_or_else(|| FieldPathError::NotFound {
                    path: path.to_string(),
                    segment: name.clone(),
                })?
            }
            (Segment::Index(index), Value::Array(items)) => {
                items
                    .get(*index)
                    .ok_or_else(|| FieldPathError::IndexOutOfBounds {
                        path: path.to_string(),
                        index: *index,
                        len: items.len(),
                    })?
            }
            (segment, Value::Null) => {
                return Err(FieldPathError::NotFound {
                    path: path.to_string(),
                    segment: segment.to_string(),
                })
            }
            (segment, other) => return Err(mismatch(path, segment, other)),
        };
    }
    Ok(current)
}

/// Write `value` at `path`, replacing whatever was there
///
/// Missing intermediate objects and arrays are created; `null` nodes along
/// the way are replaced by the container the next segment needs. An index
/// equal to an array's length appends to it.
///
/// # Errors
///
/// Returns `InvalidPath` for a malformed path, `IndexOutOfBounds` for an
/// index past the end of an array, and `NotAContainer` when a segment
/// collides with an existing scalar (or with an array where an object is
/// needed, and vice versa).
pub fn set_value(tree: &mut Value, path: &str, value: Value) -> Result<(), FieldPathError> {
    let segments = parse(path)?;
    let mut current = tree;
    for segment in &segments {
        current = child_mut(current, segment, path)?;
    }
    *current = value;
    Ok(())
}

fn child_mut<'v>(
    node: &'v mut Value,
    segment: &Segment,
    path: &str,
) -> Result<&'v mut Value, FieldPathError> {
    if node.is_null() {
        *node = match segment {
            Segment::Field(_) => Value::Object(Map::new()),
            Segment::Index(_) => Value::Array(Vec::new()),
        };
    }
    match (segment, node) {
        (Segment::Field(name), Value::Object(map)) => {
            Ok(map.entry(name.clone()).or_insert(Value::Null))
        }
        (Segment::Index(index), Value::Array(items)) => {
            let len = items.len();
            if *index == len {
                items.push(Value::Null);
            }
            items
                .get_mut(*index)
                .ok_or_else(|| FieldPathError::IndexOutOfBounds {
                    path: path.to_string(),
                    index: *index,
                    len,
                })
        }
        (segment, other) => Err(mismatch(path, segment, other)),
    }
}

fn mismatch(path: &str, segment: &Segment, found: &Value) -> FieldPathError {
    FieldPathError::NotAContainer {
        path: path.to_string(),
        segment: segment.to_string(),
        expected: segment.container(),
        found: value_type_name(found),
    }
}
