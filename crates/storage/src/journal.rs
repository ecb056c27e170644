// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only journal of modifications, one JSON object per line.

use icepeak_core::Modification;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from journal operations.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("failed to open journal {path}: {source}")]
    Open { path: PathBuf, source: std::io::Error },

    #[error("journal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode journal entry: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Open handle on the journal file.
///
/// Owned exclusively by the coordinator: appends and truncation are never
/// concurrent with each other or with replay.
pub struct Journal {
    path: PathBuf,
    file: File,
}

/// Result of replaying the journal during recovery.
pub struct Replay {
    /// Successfully decoded modifications, in file order.
    pub modifications: Vec<Modification>,
    /// Lines that failed to decode and were skipped.
    pub skipped: usize,
}

impl Journal {
    /// Open the journal read+write, creating it when absent.
    pub fn open(path: &Path) -> Result<Self, JournalError> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)
            .map_err(|source| JournalError::Open { path: path.to_path_buf(), source })?;
        Ok(Self { path: path.to_path_buf(), file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stream the journal line by line, decoding each line as a
    /// [`Modification`].
    ///
    /// Recovery is best-effort: malformed lines (including non-UTF-8
    /// garbage) are skipped, never fatal. Replay preserves file order.
    pub fn replay(&mut self) -> Result<Replay, JournalError> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut reader = BufReader::new(&self.file);
        let mut modifications = Vec::new();
        let mut skipped = 0usize;

        loop {
            let mut line = Vec::new();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match serde_json::from_slice::<Modification>(&line) {
                Ok(modification) => modifications.push(modification),
                Err(e) => {
                    skipped += 1;
                    debug!(error = %e, "skipping malformed journal line");
                }
            }
        }

        if skipped > 0 {
            warn!(
                skipped,
                recovered = modifications.len(),
                journal = %self.path.display(),
                "journal contained malformed lines"
            );
        }
        Ok(Replay { modifications, skipped })
    }

    /// Append a modification as a single JSON line. Returns the number of
    /// bytes written, including the trailing newline.
    pub fn append(&mut self, modification: &Modification) -> Result<u64, JournalError> {
        let mut line = serde_json::to_vec(modification)?;
        line.push(b'\n');
        self.file.write_all(&line)?;
        self.file.flush()?;
        Ok(line.len() as u64)
    }

    /// Truncate the journal to zero bytes after a successful sync.
    pub fn truncate(&mut self) -> Result<(), JournalError> {
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        Ok(())
    }

    /// Current size of the journal file in bytes.
    pub fn size_bytes(&self) -> Result<u64, JournalError> {
        Ok(self.file.metadata()?.len())
    }
}

#[cfg(test)]
#[path = "journal_tests.rs"]
mod tests;
