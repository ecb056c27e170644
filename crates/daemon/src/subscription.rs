// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Path trie of active subscribers.
//!
//! A modification at `changed_path` affects subscribers at every prefix of
//! the path (the change happened inside their subtree), at the path itself,
//! and in the entire subtree below it (their value may have been replaced
//! wholesale). A flat map over subscriber paths cannot answer that query
//! without scanning every subscriber; the trie walks `changed_path` once.

use crate::broadcast::{Subscriber, SubscriberId};
use icepeak_core::Path;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Node {
    children: HashMap<String, Node>,
    subscribers: HashMap<SubscriberId, Subscriber>,
}

/// Trie keyed by path segment; each node holds the subscribers registered
/// exactly at that node.
///
/// Owned by the coordinator. Connection tasks reach it only through
/// commands, which serializes registration against notification.
#[derive(Debug, Default)]
pub struct SubscriptionTree {
    root: Node,
}

impl SubscriptionTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber at its path.
    pub fn subscribe(&mut self, id: SubscriberId, subscriber: Subscriber) {
        let path = subscriber.path().clone();
        let mut node = &mut self.root;
        for segment in path.segments() {
            node = node.children.entry(segment.clone()).or_default();
        }
        node.subscribers.insert(id, subscriber);
    }

    /// Remove a registration, pruning nodes left empty. Returns whether
    /// the subscriber was present.
    pub fn unsubscribe(&mut self, path: &Path, id: SubscriberId) -> bool {
        Self::remove(&mut self.root, path.segments(), id)
    }

    fn remove(node: &mut Node, segments: &[String], id: SubscriberId) -> bool {
        let Some((head, rest)) = segments.split_first() else {
            return node.subscribers.remove(&id).is_some();
        };
        let Some(child) = node.children.get_mut(head) else {
            return false;
        };
        let removed = Self::remove(child, rest, id);
        if child.subscribers.is_empty() && child.children.is_empty() {
            node.children.remove(head);
        }
        removed
    }

    /// Subscribers affected by a modification at `changed_path`.
    ///
    /// Walks the trie along the path, collecting subscribers at every
    /// visited node (prefix and exact matches). At the deepest node the
    /// path reaches, the whole subtree is collected (extension matches).
    /// When the trie ends before the path does, only prefix subscribers
    /// are affected.
    pub fn broadcast_targets(&self, changed_path: &Path) -> Vec<(SubscriberId, Subscriber)> {
        let mut targets = Vec::new();
        let mut node = &self.root;
        for segment in changed_path.segments() {
            Self::collect_node(node, &mut targets);
            match node.children.get(segment) {
                Some(child) => node = child,
                None => return targets,
            }
        }
        Self::collect_subtree(node, &mut targets);
        targets
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        fn count(node: &Node) -> usize {
            node.subscribers.len() + node.children.values().map(count).sum::<usize>()
        }
        count(&self.root)
    }

    fn collect_node(node: &Node, out: &mut Vec<(SubscriberId, Subscriber)>) {
        out.extend(node.subscribers.iter().map(|(id, s)| (*id, s.clone())));
    }

    fn collect_subtree(node: &Node, out: &mut Vec<(SubscriberId, Subscriber)>) {
        Self::collect_node(node, out);
        for child in node.children.values() {
            Self::collect_subtree(child, out);
        }
    }
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
