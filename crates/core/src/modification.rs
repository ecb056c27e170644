// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Path-addressed modifications and their journal encoding.

use crate::path::Path;
use crate::value;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single mutation of the document.
///
/// The serde encoding is the canonical journal line format:
///
/// ```json
/// {"op":"put","path":["a","b"],"value":7}
/// {"op":"delete","path":["a","b"]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Modification {
    /// Place `value` at `path`, creating missing intermediate objects.
    Put { path: Path, value: Value },
    /// Remove the key at the final segment of `path`.
    Delete { path: Path },
}

impl Modification {
    /// The path whose subtree this modification touches.
    pub fn path(&self) -> &Path {
        match self {
            Modification::Put { path, .. } => path,
            Modification::Delete { path } => path,
        }
    }

    /// Apply this modification to a document. Total: any modification
    /// applied to any value yields a well-formed value.
    pub fn apply(&self, document: Value) -> Value {
        match self {
            Modification::Put { path, value } => value::put(document, path, value.clone()),
            Modification::Delete { path } => value::delete(document, path),
        }
    }
}

#[cfg(test)]
#[path = "modification_tests.rs"]
mod tests;
