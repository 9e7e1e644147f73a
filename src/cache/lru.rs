//! LRU Tracker Module
//!
//! Access-order bookkeeping for the optional capacity bound on the store.

use std::collections::VecDeque;

// == LRU Tracker ==
/// Records key access order so a bounded store can evict the coldest key.
///
/// Front of the deque is the most recently used key, back is the least.
/// Only consulted when the store was built with `max_entries`.
#[derive(Debug, Default)]
pub struct LruTracker {
    order: VecDeque<String>,
}

impl LruTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks `key` as most recently used, inserting it if untracked.
    pub fn touch(&mut self, key: &str) {
        self.remove(key);
        self.order.push_front(key.to_string());
    }

    // == Remove ==
    pub fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    /// Drops every tracked key for which `keep` returns false.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.order.retain(|k| keep(k.as_str()));
    }

    // == Evict Oldest ==
    /// Pops the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        self.order.pop_back()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
