// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The durable document: snapshot + journal + shared read cell.

use crate::journal::{Journal, JournalError};
use crate::snapshot::{read_snapshot, write_snapshot, SnapshotError};
use icepeak_core::{Clock, Modification, StoreMetrics};
use parking_lot::Mutex;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// File locations for the persistence layer.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Snapshot file holding the full document as one JSON value.
    pub data_file: PathBuf,
    /// Journal file; `None` disables journaling (snapshot-only durability).
    pub journal_file: Option<PathBuf>,
}

/// Cloneable wait-free read handle on the current document.
///
/// Readers briefly lock the cell to clone the `Arc`; the coordinator swaps
/// the pointer on each modification.
#[derive(Clone)]
pub struct ValueReader {
    cell: Arc<Mutex<Arc<Value>>>,
}

impl ValueReader {
    /// Snapshot of the current document.
    pub fn current(&self) -> Arc<Value> {
        Arc::clone(&self.cell.lock())
    }
}

/// Errors from loading, applying, or syncing the durable document.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Journal(#[from] JournalError),
}

/// The in-memory document together with its durability state.
///
/// Owned exclusively by the coordinator task: `apply` and `sync` are never
/// concurrent. Everything else in the process reads through [`ValueReader`].
pub struct PersistentValue<C: Clock> {
    cell: Arc<Mutex<Arc<Value>>>,
    dirty: bool,
    journal: Option<Journal>,
    data_file: PathBuf,
    metrics: Arc<StoreMetrics>,
    clock: C,
}

impl<C: Clock> PersistentValue<C> {
    /// Load the snapshot, replay the journal, and sync the recovered state
    /// back to disk (truncating the journal).
    ///
    /// A missing snapshot starts the document at `Null`. Malformed journal
    /// lines are skipped; an unreadable snapshot or journal is fatal.
    pub fn load(
        config: StorageConfig,
        metrics: Arc<StoreMetrics>,
        clock: C,
    ) -> Result<Self, PersistenceError> {
        let mut document = read_snapshot(&config.data_file)?;

        let mut journal = None;
        let mut dirty = false;
        if let Some(journal_file) = &config.journal_file {
            let mut handle = Journal::open(journal_file)?;
            let replay = handle.replay()?;
            // Dirty when anything was recovered, or when garbage lines
            // should be flushed out by the truncation in sync below.
            dirty = !replay.modifications.is_empty() || replay.skipped > 0;
            if !replay.modifications.is_empty() {
                info!(
                    replayed = replay.modifications.len(),
                    journal = %journal_file.display(),
                    "recovered modifications from journal"
                );
            }
            for modification in &replay.modifications {
                document = modification.apply(document);
            }
            journal = Some(handle);
        }

        let mut value = Self {
            cell: Arc::new(Mutex::new(Arc::new(document))),
            dirty,
            journal,
            data_file: config.data_file,
            metrics,
            clock,
        };
        value.sync()?;
        Ok(value)
    }

    /// Handle for concurrent readers.
    pub fn reader(&self) -> ValueReader {
        ValueReader { cell: Arc::clone(&self.cell) }
    }

    /// The current document.
    pub fn current(&self) -> Arc<Value> {
        Arc::clone(&self.cell.lock())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Append to the journal, then apply to the in-memory document.
    ///
    /// The journal write comes first: when it fails the in-memory document
    /// is left untouched and the error propagates to the caller, so the
    /// document never gets ahead of the journal.
    pub fn apply(&mut self, modification: &Modification) -> Result<(), PersistenceError> {
        if let Some(journal) = &mut self.journal {
            let bytes = journal.append(modification)?;
            self.metrics.record_journal_write(bytes);
        }

        {
            let mut guard = self.cell.lock();
            // Sole writer: make_mut only copies when a reader still holds
            // the previous snapshot; untouched subtrees are moved.
            let slot = Arc::make_mut(&mut *guard);
            let document = slot.take();
            *slot = modification.apply(document);
        }

        self.dirty = true;
        self.metrics.record_modification();
        Ok(())
    }

    /// Atomically rewrite the snapshot and truncate the journal.
    ///
    /// No-op when no modification arrived since the last sync. On snapshot
    /// write failure the state stays dirty so the next tick retries.
    pub fn sync(&mut self) -> Result<(), PersistenceError> {
        if !self.dirty {
            return Ok(());
        }
        self.dirty = false;
        let document = self.current();

        let bytes = match write_snapshot(&self.data_file, &document) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.dirty = true;
                return Err(e.into());
            }
        };

        // Journal entries are now contained in the snapshot. Should the
        // truncation fail, re-applying them on recovery is a no-op.
        if let Some(journal) = &mut self.journal {
            journal.truncate()?;
        }

        self.metrics.record_sync(bytes, self.clock.epoch_ms());
        Ok(())
    }
}

#[cfg(test)]
#[path = "persistence_tests.rs"]
mod tests;
