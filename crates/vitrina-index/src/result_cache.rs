//! Bounded memo of query results.
//!
//! Insertion-ordered, not LRU: reads do not refresh an entry. When an insert
//! pushes the size past capacity, the oldest half is dropped in one go.

use std::collections::{HashMap, VecDeque};

#[derive(Debug)]
pub struct ResultCache<V> {
    capacity: usize,
    entries: HashMap<String, V>,
    order: VecDeque<String>,
}

impl<V> ResultCache<V> {
    /// Creates a cache holding at most `capacity` entries (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    /// Stores `value`. Overwriting a key keeps its original position.
    pub fn set(&mut self, key: String, value: V) {
        if self.entries.insert(key.clone(), value).is_none() {
            self.order.push_back(key);
        }
        if self.entries.len() > self.capacity {
            self.evict_oldest_half();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn evict_oldest_half(&mut self) {
        let count = (self.capacity / 2).max(1);
        for key in self.order.drain(..count.min(self.order.len())) {
            self.entries.remove(&key);
        }
        tracing::debug!(evicted = count, remaining = self.entries.len(), "pruned query result cache");
    }
}
