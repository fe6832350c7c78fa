//! Bounded per-store word->count cache.
//!
//! A pure memoization of an idempotent lookup (spec.md §5): correctness of
//! a read never depends on the cache, only its latency does. Eviction is a
//! single bulk drop of the oldest half of entries once capacity is
//! reached, not strict LRU (spec.md §3's "Ownership / lifecycle").

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

const DEFAULT_CAPACITY: usize = 1000;

struct CacheInner {
    entries: HashMap<String, u64>,
    order: VecDeque<String>,
    capacity: usize,
}

impl CacheInner {
    fn insert(&mut self, term: String, count: u64) {
        if self.entries.insert(term.clone(), count).is_none() {
            self.order.push_back(term);
        }
        if self.entries.len() > self.capacity {
            let drop_count = self.entries.len() / 2;
            for _ in 0..drop_count {
                if let Some(oldest) = self.order.pop_front() {
                    self.entries.remove(&oldest);
                }
            }
        }
    }
}

/// Thread-safe bounded cache, shared read-only by all queries against a
/// store (a `Mutex` is the minimal primitive that satisfies spec.md §5's
/// "atomic or serialized cache writes" requirement).
pub struct WordCache {
    inner: Mutex<CacheInner>,
}

impl WordCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                order: VecDeque::new(),
                capacity: capacity.max(1),
            }),
        }
    }

    pub fn get(&self, term: &str) -> Option<u64> {
        self.inner.lock().expect("cache mutex poisoned").entries.get(term).copied()
    }

    pub fn insert(&self, term: &str, count: u64) {
        self.inner
            .lock()
            .expect("cache mutex poisoned")
            .insert(term.to_string(), count);
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("cache mutex poisoned");
        inner.entries.clear();
        inner.order.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache mutex poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for WordCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_after_insert() {
        let cache = WordCache::new(10);
        cache.insert("hello", 42);
        assert_eq!(cache.get("hello"), Some(42));
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn bulk_evicts_oldest_half_at_capacity() {
        let cache = WordCache::new(4);
        for i in 0..4 {
            cache.insert(&format!("w{i}"), i as u64);
        }
        assert_eq!(cache.len(), 4);
        // one more insert pushes us over capacity, triggering a bulk evict
        cache.insert("w4", 4);
        assert!(cache.len() < 5);
        // the oldest entries should be gone, the newest should remain
        assert_eq!(cache.get("w4"), Some(4));
        assert_eq!(cache.get("w0"), None);
    }
}
