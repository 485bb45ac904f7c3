//! # LFU (Least Frequently Used) Engine
//!
//! Count-bounded frequency cache with O(1) insert, access and eviction.
//! Keys are grouped into frequency buckets held in a [`FrequencyLedger`]; each
//! bucket is an insertion-ordered set, so ties on frequency are broken FIFO.
//!
//! ## Architecture
//!
//! ```text
//!   map: FxHashMap<K, Slot<V>>         ledger: FrequencyLedger<K>
//!   ┌──────┬──────────────────┐
//!   │ "a"  │ value, bucket ───┼──┐    [f=0] ──► [f=1] ──► [f=3]
//!   │ "c"  │ value, bucket ───┼──┼──────────────► {e, c}   {d, a}
//!   │ "d"  │ value, bucket ───┼──┤                 ▲        ▲
//!   │ "e"  │ value, bucket ───┼──┼─────────────────┘        │
//!   └──────┴──────────────────┘  └──────────────────────────┘
//!                                  victim: oldest member of the f=1 bucket
//! ```
//!
//! ## Insert / Access
//!
//! ```text
//!   insert(key, value)
//!     ├── key present?                 → false, nothing changes
//!     ├── capacity > 0 and len >= cap? → pop oldest of lowest bucket,
//!     │                                  unlink bucket if emptied, on_evict
//!     └── add key to the f=1 bucket right after the sentinel → true
//!
//!   access(key)    (bucket f → bucket f+1)
//!     ├── find or create f+1 directly after bucket f
//!     ├── move key's membership, unlink bucket f if emptied
//!     └── return &value
//! ```
//!
//! A key already at `u64::MAX` stays in its bucket on further accesses.
//!
//! ## Example
//!
//! ```
//! use evictkit::policy::lfu::LfuEngine;
//! use evictkit::traits::CacheEngine;
//!
//! let mut engine = LfuEngine::new(2);
//! engine.insert("hot", 1u32);
//! engine.insert("cold", 2u32);
//! engine.access(&"hot");
//!
//! engine.insert("new", 3u32); // evicts "cold"
//! assert!(engine.contains(&"hot"));
//! assert!(!engine.contains(&"cold"));
//! assert_eq!(engine.freq_key(&"hot"), Some(2));
//! ```

use std::fmt;

use rustc_hash::FxHashMap;

use crate::ds::frequency_ledger::{BucketId, FrequencyLedger};
use crate::traits::{ByteLen, CacheEngine, CacheEntry, CacheKey, EvictionFn};

#[derive(Debug)]
struct Slot<V> {
    value: V,
    bucket: BucketId,
}

/// Entry-count-bounded least-frequently-used engine.
pub struct LfuEngine<K, V> {
    map: FxHashMap<K, Slot<V>>,
    ledger: FrequencyLedger<K>,
    capacity: usize,
    on_evict: Option<EvictionFn<K, V>>,
}

impl<K, V> LfuEngine<K, V>
where
    K: CacheKey,
    V: ByteLen,
{
    /// Creates an engine holding at most `capacity` entries; `0` never evicts.
    pub fn new(capacity: usize) -> Self {
        Self {
            map: FxHashMap::default(),
            ledger: FrequencyLedger::new(),
            capacity,
            on_evict: None,
        }
    }

    /// Current access frequency of `key` (1 right after insert).
    pub fn freq_key(&self, key: &K) -> Option<u64> {
        let slot = self.map.get(key)?;
        self.ledger.frequency(slot.bucket)
    }

    /// Reads a value without counting an access.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.map.get(key).map(|slot| &slot.value)
    }

    fn evict_one(&mut self) {
        let Some(lowest) = self.ledger.lowest() else {
            return;
        };
        let Some(key) = self.ledger.pop_oldest(lowest) else {
            return;
        };
        self.ledger.unlink_if_empty(lowest);

        if let Some(slot) = self.map.remove(&key) {
            if let Some(callback) = self.on_evict.as_mut() {
                callback(CacheEntry::new(key, slot.value));
            }
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.ledger.debug_validate_invariants();

        let members: usize = self.ledger.iter_desc().map(|(_, set)| set.len()).sum();
        assert_eq!(members, self.map.len(), "every key belongs to exactly one bucket");

        for (key, slot) in &self.map {
            let set = self
                .ledger
                .members(slot.bucket)
                .expect("key points at an unlinked bucket");
            assert!(set.contains(key), "key missing from its bucket");
        }
    }
}

impl<K, V> CacheEngine<K, V> for LfuEngine<K, V>
where
    K: CacheKey,
    V: ByteLen,
{
    fn insert(&mut self, key: K, value: V) -> bool {
        if self.map.contains_key(&key) {
            return false;
        }
        if self.capacity > 0 && self.map.len() >= self.capacity {
            self.evict_one();
        }

        let bucket = self.ledger.unit_bucket();
        self.ledger.add_member(bucket, key.clone());
        self.map.insert(key, Slot { value, bucket });
        true
    }

    fn access(&mut self, key: &K) -> Option<&V> {
        let slot = self.map.get_mut(key)?;
        let current = slot.bucket;
        if let Some(next) = self.ledger.successor(current) {
            self.ledger.remove_member(current, key);
            self.ledger.add_member(next, key.clone());
            self.ledger.unlink_if_empty(current);
            slot.bucket = next;
        }
        Some(&slot.value)
    }

    fn size(&self) -> usize {
        self.map.len()
    }

    /// Highest frequency first; newest member first within a frequency.
    fn dump(&self) -> Vec<CacheEntry<&K, &V>> {
        self.ledger
            .iter_desc()
            .flat_map(|(_, members)| members.elements())
            .filter_map(|key| {
                let slot = self.map.get(key)?;
                Some(CacheEntry {
                    key,
                    value: &slot.value,
                    byte_len: key.byte_len() + slot.value.byte_len(),
                })
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
        self.ledger.clear();
    }
}

impl<K, V> fmt::Debug for LfuEngine<K, V>
where
    K: CacheKey,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuEngine")
            .field("len", &self.map.len())
            .field("buckets", &self.ledger.bucket_count())
            .field("capacity", &self.capacity)
            .field("on_evict", &self.on_evict.is_some())
            .finish()
    }
}
