//! LRU cache for text deduplication.
//!
//! Tracks how often trimmed text segments have been seen during
//! extraction so that repeated boilerplate fragments (widget titles,
//! share strips) can be dropped once they exceed the allowed number of
//! repetitions.

use std::collections::{HashMap, VecDeque};

/// Bounded least-recently-used occurrence counter.
#[derive(Debug)]
pub struct LruCache {
    capacity: usize,
    counts: HashMap<String, usize>,
    order: VecDeque<String>,
}

impl LruCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            counts: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Record one more occurrence of `key` and return the updated count.
    pub fn put(&mut self, key: &str) -> usize {
        if let Some(count) = self.counts.get_mut(key) {
            *count += 1;
            let updated = *count;
            self.touch(key);
            return updated;
        }
        if self.counts.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.counts.remove(&oldest);
            }
        }
        self.counts.insert(key.to_string(), 1);
        self.order.push_back(key.to_string());
        1
    }

    /// Number of times `key` has been recorded (0 if evicted or unseen).
    #[must_use]
    pub fn get(&self, key: &str) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }
}
