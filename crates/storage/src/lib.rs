// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! icepeak-storage: crash-safe durability for the Icepeak document.
//!
//! A full-document JSON snapshot plus an append-only journal of
//! modifications since the last sync. Recovery loads the snapshot and
//! replays the journal; sync atomically rewrites the snapshot and
//! truncates the journal.

mod journal;
mod persistence;
mod snapshot;

pub use journal::{Journal, JournalError, Replay};
pub use persistence::{PersistenceError, PersistentValue, StorageConfig, ValueReader};
pub use snapshot::{read_snapshot, write_snapshot, SnapshotError};
