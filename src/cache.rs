//! Bounded, least-recently-used response cache.
//!
//! Memoizes API responses by endpoint string for the lifetime of the owning
//! client. Once the cache is full, inserting a new endpoint evicts the entry
//! that was used least recently.

use indexmap::IndexMap;

/// Endpoint-keyed cache with a fixed maximum entry count.
///
/// Entries are kept in recency order: the front of the map is the least
/// recently used entry, the back the most recently used one.
#[derive(Debug)]
pub struct ResponseCache<V> {
    entries: IndexMap<String, V>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl<V> ResponseCache<V> {
    /// Create an empty cache holding at most `capacity` entries.
    ///
    /// A capacity of zero disables caching entirely.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    /// Look up an endpoint, marking it as most recently used on a hit.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let Some(index) = self.entries.get_index_of(key) else {
            self.misses += 1;
            return None;
        };
        self.hits += 1;
        let last = self.entries.len() - 1;
        self.entries.move_index(index, last);
        self.entries.get_index(last).map(|(_, v)| v)
    }

    /// Store a response, evicting the least recently used entry if full.
    ///
    /// Re-inserting an existing key replaces its value and refreshes it.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        if self.capacity == 0 {
            return;
        }
        let key = key.into();
        if self.entries.shift_remove(&key).is_none() && self.entries.len() >= self.capacity {
            self.entries.shift_remove_index(0);
        }
        self.entries.insert(key, value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of lookups served from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Number of lookups that missed.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Cached endpoints, least recently used first.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(|k| k.as_str()).collect()
    }

    /// Drop every cached entry. Hit and miss counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
