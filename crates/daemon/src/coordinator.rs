// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-writer coordinator for the store.
//!
//! Exactly one task owns the durable document, the journal handle, and the
//! subscription tree. Every mutation, journal write, and registration flows
//! through its bounded command queue, which linearizes modifications across
//! connections and serializes subscribe-time snapshots against concurrent
//! writes.

use crate::broadcast::{DeliveryError, Subscriber, SubscriberId};
use crate::subscription::SubscriptionTree;
use icepeak_core::{Clock, Modification, Path, StoreMetrics};
use icepeak_storage::{PersistenceError, PersistentValue};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Commands accepted by the coordinator queue.
pub enum Command {
    /// Apply a modification. The ack fires once the journal append and
    /// in-memory swap are done, before subscribers are notified.
    Modify {
        modification: Modification,
        done: oneshot::Sender<Result<(), PersistenceError>>,
    },
    /// Register a subscriber and deliver its initial snapshot.
    Subscribe { id: SubscriberId, subscriber: Subscriber },
    /// Remove a registration (connection closed).
    Unsubscribe { path: Path, id: SubscriberId },
    /// Periodic sync tick.
    Sync,
    /// Drain and stop: final sync, disconnect all subscribers.
    Shutdown,
}

/// Errors surfaced to clients issuing modifications.
#[derive(Debug, Error)]
pub enum ModifyError {
    /// The command queue is full; the writer is saturated.
    #[error("coordinator queue is full")]
    Saturated,

    /// The coordinator has shut down.
    #[error("coordinator is gone")]
    Closed,

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Cloneable sending side of the coordinator queue.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<Command>,
}

impl CoordinatorHandle {
    /// Submit a modification and wait for the durability ack.
    pub async fn modify(&self, modification: Modification) -> Result<(), ModifyError> {
        let (done, ack) = oneshot::channel();
        self.tx
            .try_send(Command::Modify { modification, done })
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => ModifyError::Saturated,
                mpsc::error::TrySendError::Closed(_) => ModifyError::Closed,
            })?;
        ack.await.map_err(|_| ModifyError::Closed)?.map_err(ModifyError::from)
    }

    /// Register a subscriber; its initial snapshot arrives on the
    /// subscriber's channel.
    pub async fn subscribe(&self, id: SubscriberId, subscriber: Subscriber) -> Result<(), ModifyError> {
        self.tx
            .send(Command::Subscribe { id, subscriber })
            .await
            .map_err(|_| ModifyError::Closed)
    }

    pub async fn unsubscribe(&self, path: Path, id: SubscriberId) -> Result<(), ModifyError> {
        self.tx
            .send(Command::Unsubscribe { path, id })
            .await
            .map_err(|_| ModifyError::Closed)
    }

    /// Request a sync pass.
    pub async fn sync(&self) -> Result<(), ModifyError> {
        self.tx.send(Command::Sync).await.map_err(|_| ModifyError::Closed)
    }

    /// Request cooperative shutdown. Commands already queued are drained
    /// first.
    pub async fn shutdown(&self) -> Result<(), ModifyError> {
        self.tx.send(Command::Shutdown).await.map_err(|_| ModifyError::Closed)
    }
}

/// The single-writer task state.
pub struct Coordinator<C: Clock> {
    rx: mpsc::Receiver<Command>,
    store: PersistentValue<C>,
    tree: SubscriptionTree,
    metrics: Arc<StoreMetrics>,
}

impl<C: Clock> Coordinator<C> {
    pub fn new(
        store: PersistentValue<C>,
        metrics: Arc<StoreMetrics>,
        queue_capacity: usize,
    ) -> (Self, CoordinatorHandle) {
        let (tx, rx) = mpsc::channel(queue_capacity);
        let coordinator = Self { rx, store, tree: SubscriptionTree::new(), metrics };
        (coordinator, CoordinatorHandle { tx })
    }

    /// Process commands until [`Command::Shutdown`] or until every handle
    /// is dropped. Performs a final sync before returning; dropping the
    /// tree closes every subscriber channel, which the connection tasks
    /// observe as a disconnect.
    pub async fn run(mut self) {
        while let Some(command) = self.rx.recv().await {
            match command {
                Command::Modify { modification, done } => {
                    let result = self.store.apply(&modification);
                    let notify = result.is_ok();
                    if let Err(e) = &result {
                        error!(error = %e, path = %modification.path(), "modification failed");
                    }
                    // Ack once the journal append is durable; notification
                    // happens after so the journal is never behind what
                    // subscribers have seen.
                    let _ = done.send(result);
                    if notify {
                        self.notify(modification.path());
                    }
                }
                Command::Subscribe { id, subscriber } => self.handle_subscribe(id, subscriber),
                Command::Unsubscribe { path, id } => {
                    if self.tree.unsubscribe(&path, id) {
                        self.metrics.subscriber_removed();
                        debug!(%id, path = %path, "unsubscribed");
                    }
                }
                Command::Sync => {
                    if let Err(e) = self.store.sync() {
                        error!(error = %e, "sync failed; retrying on next tick");
                    }
                }
                Command::Shutdown => break,
            }
        }

        if let Err(e) = self.store.sync() {
            error!(error = %e, "final sync failed");
        }
        info!("coordinator stopped");
    }

    /// Deliver the initial snapshot, then register. A subscriber whose
    /// channel is already unusable is never inserted.
    fn handle_subscribe(&mut self, id: SubscriberId, subscriber: Subscriber) {
        let document = self.store.current();
        let value = icepeak_core::get(&document, subscriber.path())
            .cloned()
            .unwrap_or(Value::Null);
        match subscriber.deliver(Arc::new(value)) {
            Ok(()) => {
                debug!(%id, path = %subscriber.path(), "subscribed");
                self.tree.subscribe(id, subscriber);
                self.metrics.subscriber_added();
            }
            Err(e) => {
                warn!(%id, path = %subscriber.path(), error = %e, "dropping subscriber at registration");
            }
        }
    }

    /// Fan a change out to every affected subscriber. Lagging or
    /// disconnected subscribers are removed from the tree.
    fn notify(&mut self, changed_path: &Path) {
        let document = self.store.current();
        let mut dropped: Vec<(SubscriberId, Path)> = Vec::new();

        for (id, subscriber) in self.tree.broadcast_targets(changed_path) {
            let value = icepeak_core::get(&document, subscriber.path())
                .cloned()
                .unwrap_or(Value::Null);
            if let Err(e) = subscriber.deliver(Arc::new(value)) {
                if e == DeliveryError::Lagging {
                    warn!(%id, path = %subscriber.path(), "subscriber not keeping up, disconnecting");
                }
                dropped.push((id, subscriber.path().clone()));
            }
        }

        for (id, path) in dropped {
            if self.tree.unsubscribe(&path, id) {
                self.metrics.subscriber_removed();
            }
        }
    }
}

/// Drive periodic syncs by ticking the coordinator queue. Stops when the
/// coordinator goes away.
pub fn spawn_sync_ticker(handle: CoordinatorHandle, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if handle.sync().await.is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
