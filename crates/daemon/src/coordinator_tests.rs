// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use icepeak_core::FakeClock;
use icepeak_storage::{read_snapshot, StorageConfig, ValueReader};
use serde_json::json;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};
use tokio::time::timeout;

struct Harness {
    _dir: TempDir,
    data_file: PathBuf,
    journal_file: PathBuf,
    reader: ValueReader,
    handle: CoordinatorHandle,
    task: JoinHandle<()>,
    metrics: Arc<StoreMetrics>,
}

fn start() -> Harness {
    let dir = tempdir().unwrap();
    let data_file = dir.path().join("store.json");
    let journal_file = dir.path().join("store.journal");
    let config = StorageConfig {
        data_file: data_file.clone(),
        journal_file: Some(journal_file.clone()),
    };
    let metrics = Arc::new(StoreMetrics::default());
    let store = PersistentValue::load(config, Arc::clone(&metrics), FakeClock::new()).unwrap();
    let reader = store.reader();
    let (coordinator, handle) = Coordinator::new(store, Arc::clone(&metrics), 64);
    let task = tokio::spawn(coordinator.run());
    Harness { _dir: dir, data_file, journal_file, reader, handle, task, metrics }
}

fn put(path: &str, value: Value) -> Modification {
    Modification::Put { path: Path::from_url_path(path), value }
}

async fn recv(rx: &mut mpsc::Receiver<Arc<Value>>) -> Option<Value> {
    timeout(Duration::from_secs(1), rx.recv())
        .await
        .ok()
        .flatten()
        .map(|v| v.as_ref().clone())
}

async fn subscribe(h: &Harness, path: &str, capacity: usize) -> (SubscriberId, mpsc::Receiver<Arc<Value>>) {
    let id = SubscriberId::next();
    let (subscriber, rx) = Subscriber::new(Path::from_url_path(path), capacity);
    h.handle.subscribe(id, subscriber).await.unwrap();
    (id, rx)
}

#[tokio::test]
async fn modify_applies_journals_and_acks() {
    let h = start();

    h.handle.modify(put("/users/1", json!({"name": "Alice"}))).await.unwrap();

    assert_eq!(*h.reader.current(), json!({"users": {"1": {"name": "Alice"}}}));
    let journal = std::fs::read_to_string(&h.journal_file).unwrap();
    assert_eq!(journal.lines().count(), 1);
}

#[tokio::test]
async fn modifications_from_one_handle_apply_in_order() {
    let h = start();

    for n in 0..10 {
        h.handle.modify(put("/n", json!(n))).await.unwrap();
    }

    assert_eq!(*h.reader.current(), json!({"n": 9}));
    assert_eq!(h.metrics.snapshot().modifications_applied, 10);
}

#[tokio::test]
async fn subscriber_receives_initial_snapshot() {
    let h = start();
    h.handle.modify(put("/k", json!(1))).await.unwrap();

    let (_, mut rx) = subscribe(&h, "/k", 8).await;
    assert_eq!(recv(&mut rx).await, Some(json!(1)));

    let (_, mut absent) = subscribe(&h, "/nothing/here", 8).await;
    assert_eq!(recv(&mut absent).await, Some(Value::Null));
}

#[tokio::test]
async fn fans_out_to_prefix_and_extension_subscribers() {
    let h = start();
    let (_, mut at_a) = subscribe(&h, "/a", 8).await;
    let (_, mut at_ab) = subscribe(&h, "/a/b", 8).await;
    assert_eq!(recv(&mut at_a).await, Some(Value::Null));
    assert_eq!(recv(&mut at_ab).await, Some(Value::Null));

    h.handle.modify(put("/a/b/c", json!(1))).await.unwrap();

    assert_eq!(recv(&mut at_a).await, Some(json!({"b": {"c": 1}})));
    assert_eq!(recv(&mut at_ab).await, Some(json!({"c": 1})));
}

#[tokio::test]
async fn extension_subscriber_sees_null_when_its_branch_vanishes() {
    let h = start();
    h.handle.modify(put("/a/b", json!(1))).await.unwrap();

    let (_, mut rx) = subscribe(&h, "/a/b", 8).await;
    assert_eq!(recv(&mut rx).await, Some(json!(1)));

    // The subtree containing /a/b is replaced by a scalar.
    h.handle.modify(put("/a", json!(5))).await.unwrap();
    assert_eq!(recv(&mut rx).await, Some(Value::Null));
}

#[tokio::test]
async fn unrelated_changes_are_not_delivered() {
    let h = start();
    let (_, mut rx) = subscribe(&h, "/a", 8).await;
    assert_eq!(recv(&mut rx).await, Some(Value::Null));

    h.handle.modify(put("/other", json!(1))).await.unwrap();
    h.handle.modify(put("/a", json!(2))).await.unwrap();

    // The /other change was filtered out; the next frame is /a's value.
    assert_eq!(recv(&mut rx).await, Some(json!(2)));
}

#[tokio::test]
async fn unsubscribe_closes_the_channel() {
    let h = start();
    let (id, mut rx) = subscribe(&h, "/a", 8).await;
    assert_eq!(recv(&mut rx).await, Some(Value::Null));

    h.handle.unsubscribe(Path::from_url_path("/a"), id).await.unwrap();
    h.handle.modify(put("/a", json!(1))).await.unwrap();

    // The tree dropped the sending half, so the channel closes without
    // delivering the modification.
    assert_eq!(recv(&mut rx).await, None);
    assert_eq!(h.metrics.snapshot().subscriber_count, 0);
}

#[tokio::test]
async fn lagging_subscriber_is_disconnected() {
    let h = start();
    // Capacity 1: the initial snapshot fills the buffer.
    let (_, mut rx) = subscribe(&h, "/a", 1).await;

    h.handle.modify(put("/a", json!(1))).await.unwrap();

    // The delivery found the buffer full; the subscription was dropped.
    assert_eq!(recv(&mut rx).await, Some(Value::Null));
    assert_eq!(recv(&mut rx).await, None);
    assert_eq!(h.metrics.snapshot().subscriber_count, 0);
}

#[tokio::test]
async fn sync_command_writes_the_snapshot() {
    let h = start();
    h.handle.modify(put("/k", json!(1))).await.unwrap();
    h.handle.sync().await.unwrap();
    // A subsequent acked command proves the sync was processed.
    h.handle.modify(put("/k2", json!(2))).await.unwrap();

    assert_eq!(read_snapshot(&h.data_file).unwrap(), json!({"k": 1}));
    let journal = std::fs::read_to_string(&h.journal_file).unwrap();
    assert_eq!(journal.lines().count(), 1, "only the post-sync entry remains");
}

#[tokio::test]
async fn shutdown_final_syncs_and_disconnects_subscribers() {
    let h = start();
    let (_, mut rx) = subscribe(&h, "/k", 8).await;
    assert_eq!(recv(&mut rx).await, Some(Value::Null));

    h.handle.modify(put("/k", json!(7))).await.unwrap();
    assert_eq!(recv(&mut rx).await, Some(json!(7)));

    h.handle.shutdown().await.unwrap();
    h.task.await.unwrap();

    assert_eq!(read_snapshot(&h.data_file).unwrap(), json!({"k": 7}));
    assert_eq!(std::fs::metadata(&h.journal_file).unwrap().len(), 0);
    assert_eq!(recv(&mut rx).await, None);
}
