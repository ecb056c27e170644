// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn counters_accumulate() {
    let metrics = StoreMetrics::default();
    metrics.record_modification();
    metrics.record_modification();
    metrics.record_journal_write(40);
    metrics.record_journal_write(2);

    let snap = metrics.snapshot();
    assert_eq!(snap.modifications_applied, 2);
    assert_eq!(snap.journal_written_bytes, 42);
}

#[test]
fn sync_sets_gauge_and_accumulates_written() {
    let metrics = StoreMetrics::default();
    metrics.record_sync(100, 5_000);
    metrics.record_sync(60, 6_000);

    let snap = metrics.snapshot();
    assert_eq!(snap.data_size_bytes, 60);
    assert_eq!(snap.data_written_bytes, 160);
    assert_eq!(snap.last_sync_ms, 6_000);
}

#[test]
fn subscriber_gauge_tracks_adds_and_removes() {
    let metrics = StoreMetrics::default();
    metrics.subscriber_added();
    metrics.subscriber_added();
    metrics.subscriber_removed();
    assert_eq!(metrics.snapshot().subscriber_count, 1);
}
