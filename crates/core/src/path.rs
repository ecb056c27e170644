// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Paths addressing locations in the document.

use serde::{Deserialize, Serialize};

/// An ordered sequence of object-key segments. The empty path is the root.
///
/// Paths address nested object keys only; arrays are opaque values and are
/// not navigable. Serializes as a JSON array of strings, matching the
/// journal encoding (`"path":["a","b"]`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<String>);

impl Path {
    /// The root path (empty segment list).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Parse a URL path: split on `/`, drop empty segments.
    ///
    /// `"/"`, `""`, and `"//"` all parse to the root path; `"/a//b/"`
    /// parses to `a/b`.
    pub fn from_url_path(raw: &str) -> Self {
        Self(raw.split('/').filter(|s| !s.is_empty()).map(str::to_owned).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `prefix` is a leading subsequence of this path.
    ///
    /// Every path starts with the root (empty) prefix.
    pub fn starts_with(&self, prefix: &[String]) -> bool {
        self.0.len() >= prefix.len() && self.0[..prefix.len()] == *prefix
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.0.join("/"))
    }
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;
