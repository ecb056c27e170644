// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store metrics shared between the storage layer and the exporter.
//!
//! Plain atomic counters so the storage crate stays free of any metrics
//! backend; the daemon renders a [`MetricsSnapshot`] into the Prometheus
//! text format on scrape.

use std::sync::atomic::{AtomicU64, Ordering};

/// Shared counters updated from the coordinator and storage layer.
#[derive(Debug, Default)]
pub struct StoreMetrics {
    /// Size of the snapshot file after the last sync (gauge).
    data_size_bytes: AtomicU64,
    /// Total bytes written to the snapshot file (counter).
    data_written_bytes: AtomicU64,
    /// Total bytes appended to the journal (counter).
    journal_written_bytes: AtomicU64,
    /// Modifications applied to the in-memory value (counter).
    modifications_applied: AtomicU64,
    /// Currently registered subscribers (gauge).
    subscriber_count: AtomicU64,
    /// Wall-clock time of the last completed sync (gauge, epoch ms).
    last_sync_ms: AtomicU64,
}

/// Point-in-time copy of [`StoreMetrics`] for export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub data_size_bytes: u64,
    pub data_written_bytes: u64,
    pub journal_written_bytes: u64,
    pub modifications_applied: u64,
    pub subscriber_count: u64,
    pub last_sync_ms: u64,
}

impl StoreMetrics {
    pub fn record_modification(&self) {
        self.modifications_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_journal_write(&self, bytes: u64) {
        self.journal_written_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_sync(&self, snapshot_bytes: u64, epoch_ms: u64) {
        self.data_size_bytes.store(snapshot_bytes, Ordering::Relaxed);
        self.data_written_bytes.fetch_add(snapshot_bytes, Ordering::Relaxed);
        self.last_sync_ms.store(epoch_ms, Ordering::Relaxed);
    }

    pub fn subscriber_added(&self) {
        self.subscriber_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn subscriber_removed(&self) {
        self.subscriber_count.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            data_size_bytes: self.data_size_bytes.load(Ordering::Relaxed),
            data_written_bytes: self.data_written_bytes.load(Ordering::Relaxed),
            journal_written_bytes: self.journal_written_bytes.load(Ordering::Relaxed),
            modifications_applied: self.modifications_applied.load(Ordering::Relaxed),
            subscriber_count: self.subscriber_count.load(Ordering::Relaxed),
            last_sync_ms: self.last_sync_ms.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
