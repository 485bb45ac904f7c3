//! # LRU (Least Recently Used) Engine
//!
//! Byte-bounded recency cache. Entries are kept in a [`RecencyList`] ordered
//! from most to least recently used, and an `FxHashMap` maps each key to its
//! list node so that lookups, promotions and evictions are all O(1).
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                          LruEngine<K, V>                             │
//!   │                                                                      │
//!   │   map: FxHashMap<K, SlotId>                                          │
//!   │   ┌──────┬────────┐                                                  │
//!   │   │ "a"  │ id_2 ──┼──────────────────────────┐                       │
//!   │   │ "b"  │ id_0 ──┼───────┐                  │                       │
//!   │   │ "c"  │ id_1 ──┼──┐    │                  │                       │
//!   │   └──────┴────────┘  │    │                  │                       │
//!   │                      ▼    ▼                  ▼                       │
//!   │   list:  head ──► [c, 2B] ◄──► [b, 2B] ◄──► [a, 2B] ◄── tail         │
//!   │                   (MRU)                     (LRU, next victim)       │
//!   │                                                                      │
//!   │   size: 6 bytes            capacity: 6 bytes (0 = unbounded)         │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Insert Flow
//!
//! ```text
//!   insert(key, value)
//!        │
//!        ├── key present? ──► promote to head, return false (value kept)
//!        │
//!        ├── capacity > 0 and (size == 0 or size >= capacity)?
//!        │        └──► evict tail once, fire on_evict
//!        │
//!        └── push [key, value, key.byte_len() + value.byte_len()] at head,
//!            size += entry length, return true
//! ```
//!
//! Only one eviction is attempted per insert, so a single oversized entry can
//! leave `size()` above `capacity()` until later inserts evict further.
//!
//! ## Operations
//!
//! | Operation  | Time | Notes                                 |
//! |------------|------|---------------------------------------|
//! | `insert`   | O(1) | at most one eviction                  |
//! | `access`   | O(1) | promotes to head                      |
//! | `peek`     | O(1) | no promotion                          |
//! | `contains` | O(1) | no promotion                          |
//! | `dump`     | O(n) | head (MRU) to tail (LRU)              |
//! | `free`     | O(n) | no eviction callbacks                 |
//!
//! ## Example
//!
//! ```
//! use evictkit::policy::lru::LruEngine;
//! use evictkit::traits::CacheEngine;
//!
//! let mut engine = LruEngine::new(6);
//! engine.insert("a", "1");
//! engine.insert("b", "2");
//! engine.insert("c", "3");
//! engine.access(&"a");
//!
//! engine.insert("d", "4"); // evicts "b"
//! let order: Vec<_> = engine.dump().iter().map(|e| *e.key).collect();
//! assert_eq!(order, vec!["d", "a", "c"]);
//! assert_eq!(engine.size(), 6);
//! ```

use std::fmt;

use rustc_hash::FxHashMap;

use crate::ds::recency_list::RecencyList;
use crate::ds::slot_arena::SlotId;
use crate::traits::{ByteLen, CacheEngine, CacheEntry, CacheKey, EvictionFn};

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    byte_len: usize,
}

/// Byte-bounded least-recently-used engine.
pub struct LruEngine<K, V> {
    map: FxHashMap<K, SlotId>,
    list: RecencyList<Node<K, V>>,
    capacity: usize,
    size: usize,
    on_evict: Option<EvictionFn<K, V>>,
}

impl<K, V> LruEngine<K, V>
where
    K: CacheKey,
    V: ByteLen,
{
    /// Creates an engine bounded to `capacity` bytes; `0` never evicts.
    pub fn new(capacity: usize) -> Self {
        Self {
            map: FxHashMap::default(),
            list: RecencyList::new(),
            capacity,
            size: 0,
            on_evict: None,
        }
    }

    /// Reads a value without promoting it.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.map.get(key)?;
        self.list.get(id).map(|node| &node.value)
    }

    /// Least recently used entry, i.e. the next eviction victim.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.list.back().map(|node| (&node.key, &node.value))
    }

    fn evict_one(&mut self) {
        let Some(node) = self.list.pop_back() else {
            return;
        };
        self.map.remove(&node.key);
        self.size -= node.byte_len;
        if let Some(callback) = self.on_evict.as_mut() {
            callback(CacheEntry {
                key: node.key,
                value: node.value,
                byte_len: node.byte_len,
            });
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.list.debug_validate_invariants();
        assert_eq!(self.map.len(), self.list.len());

        let total: usize = self.list.iter().map(|node| node.byte_len).sum();
        assert_eq!(total, self.size, "size must equal the sum of entry lengths");

        for (key, &id) in &self.map {
            let node = self.list.get(id).expect("map points at a freed node");
            assert!(node.key == *key, "map and list disagree on key");
        }
    }
}

impl<K, V> CacheEngine<K, V> for LruEngine<K, V>
where
    K: CacheKey,
    V: ByteLen,
{
    fn insert(&mut self, key: K, value: V) -> bool {
        if let Some(&id) = self.map.get(&key) {
            self.list.move_to_front(id);
            return false;
        }

        if self.capacity > 0 && (self.size == 0 || self.size >= self.capacity) {
            self.evict_one();
        }

        let byte_len = key.byte_len() + value.byte_len();
        let id = self.list.push_front(Node {
            key: key.clone(),
            value,
            byte_len,
        });
        self.map.insert(key, id);
        self.size += byte_len;
        true
    }

    fn access(&mut self, key: &K) -> Option<&V> {
        let id = *self.map.get(key)?;
        self.list.move_to_front(id);
        self.list.get(id).map(|node| &node.value)
    }

    fn size(&self) -> usize {
        self.size
    }

    fn dump(&self) -> Vec<CacheEntry<&K, &V>> {
        self.list
            .iter()
            .map(|node| CacheEntry {
                key: &node.key,
                value: &node.value,
                byte_len: node.byte_len,
            })
            .collect()
    }

    fn on_evict(&mut self, callback: EvictionFn<K, V>) {
        self.on_evict = Some(callback);
    }

    fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn free(&mut self) {
        self.map.clear();
        self.list.clear();
        self.size = 0;
    }
}

impl<K, V> fmt::Debug for LruEngine<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruEngine")
            .field("len", &self.map.len())
            .field("size", &self.size)
            .field("capacity", &self.capacity)
            .field("on_evict", &self.on_evict.is_some())
            .finish()
    }
}
