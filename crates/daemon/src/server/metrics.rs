// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prometheus text exposition of the store counters.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use icepeak_core::{MetricsSnapshot, StoreMetrics};
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use std::sync::Arc;
use tracing::error;

/// Router for the metrics listener, typically bound to a separate port.
pub fn metrics_router(metrics: Arc<StoreMetrics>) -> Router {
    Router::new().route("/metrics", get(scrape)).with_state(metrics)
}

async fn scrape(State(metrics): State<Arc<StoreMetrics>>) -> Response {
    match render(&metrics.snapshot()) {
        Ok(text) => {
            ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], text).into_response()
        }
        Err(e) => {
            error!(error = %e, "failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Render a snapshot of the live atomics into the text format. The store
/// counters stay backend-free in icepeak-core; a fresh registry per scrape
/// projects them into Prometheus types.
fn render(snap: &MetricsSnapshot) -> Result<String, prometheus::Error> {
    let registry = Registry::new();

    let data_size = IntGauge::new("icepeak_data_size_bytes", "Snapshot file size after the last sync")?;
    data_size.set(snap.data_size_bytes as i64);
    registry.register(Box::new(data_size))?;

    let subscribers = IntGauge::new("icepeak_subscribers", "Currently registered subscribers")?;
    subscribers.set(snap.subscriber_count as i64);
    registry.register(Box::new(subscribers))?;

    let last_sync = IntGauge::new(
        "icepeak_last_sync_timestamp_ms",
        "Wall-clock time of the last completed sync, epoch milliseconds",
    )?;
    last_sync.set(snap.last_sync_ms as i64);
    registry.register(Box::new(last_sync))?;

    let data_written =
        IntCounter::new("icepeak_data_written_bytes_total", "Bytes written to the snapshot file")?;
    data_written.inc_by(snap.data_written_bytes);
    registry.register(Box::new(data_written))?;

    let journal_written =
        IntCounter::new("icepeak_journal_written_bytes_total", "Bytes appended to the journal")?;
    journal_written.inc_by(snap.journal_written_bytes);
    registry.register(Box::new(journal_written))?;

    let modifications =
        IntCounter::new("icepeak_modifications_total", "Modifications applied to the document")?;
    modifications.inc_by(snap.modifications_applied);
    registry.register(Box::new(modifications))?;

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
