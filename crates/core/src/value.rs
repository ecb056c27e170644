// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure operations on the JSON document.
//!
//! All three operations are total: any modification applied to any value
//! yields a well-formed value. `put` and `delete` consume their input and
//! rebuild only the nodes along the path; untouched subtrees are moved,
//! not copied.

use crate::path::Path;
use serde_json::{Map, Value};

/// Read the value at `path`. The empty path returns the whole document.
///
/// Descends object keys only; a non-object or missing key yields `None`.
pub fn get<'a>(value: &'a Value, path: &Path) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.segments() {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Place `new` at `path`, creating missing intermediate objects.
///
/// An intermediate that exists but is not an object is overwritten by a
/// fresh object containing the remainder of the path.
pub fn put(value: Value, path: &Path, new: Value) -> Value {
    put_at(value, path.segments(), new)
}

fn put_at(value: Value, segments: &[String], new: Value) -> Value {
    let Some((head, rest)) = segments.split_first() else {
        return new;
    };
    match value {
        Value::Object(mut map) => {
            // Mutate the slot in place so insertion order is preserved
            // for keys that already exist.
            let slot = map.entry(head.clone()).or_insert(Value::Null);
            let child = slot.take();
            *slot = put_at(child, rest, new);
            Value::Object(map)
        }
        _ => {
            let mut map = Map::new();
            map.insert(head.clone(), put_at(Value::Null, rest, new));
            Value::Object(map)
        }
    }
}

/// Remove the key at the final segment of `path`.
///
/// No-op when the parent is not an object or the key is absent. Deleting
/// the root replaces the document with `Null`.
pub fn delete(value: Value, path: &Path) -> Value {
    delete_at(value, path.segments())
}

fn delete_at(value: Value, segments: &[String]) -> Value {
    let Some((head, rest)) = segments.split_first() else {
        return Value::Null;
    };
    match value {
        Value::Object(mut map) => {
            if rest.is_empty() {
                map.shift_remove(head.as_str());
            } else if let Some(slot) = map.get_mut(head.as_str()) {
                let child = slot.take();
                *slot = delete_at(child, rest);
            }
            Value::Object(map)
        }
        other => other,
    }
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;
