// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Full-document snapshot with atomic replacement.

use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from snapshot operations.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("snapshot {path} is not valid JSON: {source}")]
    Decode { path: PathBuf, source: serde_json::Error },

    #[error("failed to write snapshot {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },

    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Read and decode the snapshot file.
///
/// A missing or empty file yields `Null`, so a first start needs no seed
/// file. An unreadable or undecodable snapshot is fatal: silently starting
/// empty would discard the operator's data.
pub fn read_snapshot(path: &Path) -> Result<Value, SnapshotError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Value::Null),
        Err(source) => return Err(SnapshotError::Read { path: path.to_path_buf(), source }),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes)
        .map_err(|source| SnapshotError::Decode { path: path.to_path_buf(), source })
}

/// Serialize `value` to a sibling temp file and atomically rename it over
/// `path` (POSIX rename). Returns the number of bytes written.
///
/// A crash before the rename leaves the previous snapshot intact.
pub fn write_snapshot(path: &Path, value: &Value) -> Result<u64, SnapshotError> {
    let tmp = temp_path(path);
    let bytes = serde_json::to_vec(value)?;
    std::fs::write(&tmp, &bytes)
        .map_err(|source| SnapshotError::Write { path: tmp.clone(), source })?;
    std::fs::rename(&tmp, path)
        .map_err(|source| SnapshotError::Write { path: path.to_path_buf(), source })?;
    Ok(bytes.len() as u64)
}

/// Temp file next to the snapshot: `icepeak.json` → `icepeak.json.new`.
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".new");
    PathBuf::from(name)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
