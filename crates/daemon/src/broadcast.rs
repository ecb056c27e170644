// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-subscriber outbound channels.
//!
//! The coordinator extracts the sub-value for each affected subscriber and
//! enqueues it here without blocking. JSON serialization happens in the
//! connection task, keeping the writer hot path short.

use icepeak_core::Path;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Process-unique subscriber id, used to remove a single registration when
/// several subscribers share a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Why a delivery failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// The outbound buffer is full; the subscriber is not keeping up.
    #[error("subscriber channel is full")]
    Lagging,
    /// The connection task dropped its receiver.
    #[error("subscriber disconnected")]
    Disconnected,
}

/// Sending half of a subscriber's outbound channel, tagged with the
/// subscription path.
#[derive(Debug, Clone)]
pub struct Subscriber {
    path: Path,
    tx: mpsc::Sender<Arc<Value>>,
}

impl Subscriber {
    /// Create a subscriber with a bounded outbound buffer. The receiving
    /// half belongs to the connection task.
    pub fn new(path: Path, capacity: usize) -> (Self, mpsc::Receiver<Arc<Value>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { path, tx }, rx)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Non-blocking delivery of the current value at the subscription
    /// path. The coordinator must never wait on a slow subscriber.
    pub fn deliver(&self, value: Arc<Value>) -> Result<(), DeliveryError> {
        self.tx.try_send(value).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::Lagging,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Disconnected,
        })
    }
}

#[cfg(test)]
#[path = "broadcast_tests.rs"]
mod tests;
