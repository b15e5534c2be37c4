//! Capacity-bounded cache with time-to-live expiry
//!
//! Expired entries read as misses. When full, the least recently used entry is
//! evicted. Callers pass the current `Instant` so expiry is testable.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
    last_used: u64,
}

#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    capacity: usize,
    ttl: Duration,
    entries: HashMap<K, Entry<V>>,
    clock: u64,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            ttl,
            entries: HashMap::with_capacity(capacity),
            clock: 0,
        }
    }

    /// Live value for `key`; expired entries are dropped
    pub fn get(&mut self, key: &K, now: Instant) -> Option<V> {
        let expired = match self.entries.get(key) {
            None => return None,
            Some(entry) => now.saturating_duration_since(entry.inserted_at) >= self.ttl,
        };
        if expired {
            self.entries.remove(key);
            return None;
        }

        self.clock += 1;
        let clock = self.clock;
        self.entries.get_mut(key).map(|entry| {
            entry.last_used = clock;
            entry.value.clone()
        })
    }

    /// Insert or refresh `key`, evicting expired entries then the least recently used
    pub fn insert(&mut self, key: K, value: V, now: Instant) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.purge_expired(now);
            if self.entries.len() >= self.capacity {
                self.evict_lru();
            }
        }
        self.clock += 1;
        self.entries.insert(
            key,
            Entry {
                value,
                inserted_at: now,
                last_used: self.clock,
            },
        );
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    /// Drop every expired entry
    pub fn purge_expired(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.inserted_at) < ttl);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Stored entries, expired ones included until touched or purged
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn evict_lru(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}
