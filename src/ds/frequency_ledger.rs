//! Ordered chain of frequency buckets for O(1) LFU bookkeeping.
//!
//! ## Architecture
//!
//! ```text
//!   buckets: SlotArena<Bucket<K>>
//!
//!   [sentinel f=0] ──► [f=1] ◄──► [f=2] ◄──► [f=5]
//!                        │          │          │
//!                        ▼          ▼          ▼
//!                    {d, c, b}     {e}       {a}      (InsertionOrderedSet,
//!                     newest→oldest                    newest first)
//!                                                ▲
//!                                          last ─┘
//! ```
//!
//! The chain always starts at a sentinel bucket of frequency 0 that is never
//! unlinked. Real buckets exist only while they have members (callers unlink
//! emptied buckets with [`unlink_if_empty`](FrequencyLedger::unlink_if_empty)),
//! and their frequencies strictly increase walking away from the sentinel.
//!
//! Buckets are addressed by [`BucketId`], which stays valid for as long as the
//! bucket is linked. The LFU engine stores one per key as its owning-bucket
//! reference.
//!
//! ## Operations
//!
//! | Operation           | Time | Notes                                       |
//! |---------------------|------|---------------------------------------------|
//! | `unit_bucket`       | O(1) | find or create f=1 right after the sentinel |
//! | `successor`         | O(1) | find or create f+1 right after a bucket     |
//! | `add_member`        | O(1) |                                             |
//! | `remove_member`     | O(1) |                                             |
//! | `pop_oldest`        | O(1) | FIFO within one bucket                      |
//! | `unlink_if_empty`   | O(1) |                                             |
//! | `iter_desc`         | O(b) | highest frequency first                     |

use std::hash::Hash;

use crate::ds::ordered_set::InsertionOrderedSet;
use crate::ds::slot_arena::{SlotArena, SlotId};

/// Handle to a bucket in a [`FrequencyLedger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BucketId(SlotId);

#[derive(Debug)]
struct Bucket<K> {
    frequency: u64,
    members: InsertionOrderedSet<K>,
    prev: Option<BucketId>,
    next: Option<BucketId>,
}

/// Sentinel-headed, frequency-ordered chain of member sets.
#[derive(Debug)]
pub struct FrequencyLedger<K> {
    buckets: SlotArena<Bucket<K>>,
    sentinel: BucketId,
    last: BucketId,
}

impl<K> FrequencyLedger<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        let mut buckets = SlotArena::new();
        let sentinel = BucketId(buckets.insert(Bucket {
            frequency: 0,
            members: InsertionOrderedSet::new(),
            prev: None,
            next: None,
        }));
        Self {
            buckets,
            sentinel,
            last: sentinel,
        }
    }

    /// The frequency-0 head of the chain.
    pub fn sentinel(&self) -> BucketId {
        self.sentinel
    }

    /// Lowest-frequency real bucket, i.e. the eviction candidate.
    pub fn lowest(&self) -> Option<BucketId> {
        self.bucket(self.sentinel).and_then(|b| b.next)
    }

    /// Number of real (non-sentinel) buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len() - 1
    }

    pub fn frequency(&self, id: BucketId) -> Option<u64> {
        self.bucket(id).map(|b| b.frequency)
    }

    pub fn members(&self, id: BucketId) -> Option<&InsertionOrderedSet<K>> {
        self.bucket(id).map(|b| &b.members)
    }

    /// Returns the frequency-1 bucket directly after the sentinel, creating it
    /// if the chain is empty or starts at a higher frequency.
    pub fn unit_bucket(&mut self) -> BucketId {
        if let Some(first) = self.lowest() {
            if self.frequency(first) == Some(1) {
                return first;
            }
        }
        self.insert_after(self.sentinel, 1)
    }

    /// Returns the bucket for `frequency(id) + 1` directly after `id`, creating
    /// it unless the next bucket already carries exactly that frequency.
    ///
    /// Returns `None` if `id` is stale or its frequency cannot be incremented.
    pub fn successor(&mut self, id: BucketId) -> Option<BucketId> {
        let (frequency, next) = {
            let bucket = self.bucket(id)?;
            (bucket.frequency, bucket.next)
        };
        let target = frequency.checked_add(1)?;
        if let Some(next) = next {
            if self.frequency(next) == Some(target) {
                return Some(next);
            }
        }
        Some(self.insert_after(id, target))
    }

    /// Adds `key` as the newest member of bucket `id`.
    pub fn add_member(&mut self, id: BucketId, key: K) -> bool {
        match self.bucket_mut(id) {
            Some(bucket) => bucket.members.add(key),
            None => false,
        }
    }

    pub fn remove_member(&mut self, id: BucketId, key: &K) -> bool {
        match self.bucket_mut(id) {
            Some(bucket) => bucket.members.remove(key),
            None => false,
        }
    }

    /// Removes and returns the member that entered bucket `id` first.
    pub fn pop_oldest(&mut self, id: BucketId) -> Option<K> {
        self.bucket_mut(id)?.members.pop_oldest()
    }

    /// Unlinks and frees bucket `id` if it has no members.
    ///
    /// The sentinel is never unlinked. Returns `true` if the bucket was removed.
    pub fn unlink_if_empty(&mut self, id: BucketId) -> bool {
        if id == self.sentinel {
            return false;
        }
        let (prev, next) = match self.bucket(id) {
            Some(bucket) if bucket.members.is_empty() => (bucket.prev, bucket.next),
            _ => return false,
        };
        let prev = prev.unwrap_or(self.sentinel);

        if let Some(prev_bucket) = self.bucket_mut(prev) {
            prev_bucket.next = next;
        }
        match next {
            Some(next) => {
                if let Some(next_bucket) = self.bucket_mut(next) {
                    next_bucket.prev = Some(prev);
                }
            },
            None => self.last = prev,
        }
        self.buckets.remove(id.0);
        true
    }

    /// Iterates real buckets from highest to lowest frequency.
    pub fn iter_desc(&self) -> impl Iterator<Item = (u64, &InsertionOrderedSet<K>)> {
        let mut cursor = (self.last != self.sentinel).then_some(self.last);
        std::iter::from_fn(move || {
            let id = cursor?;
            let bucket = self.bucket(id)?;
            cursor = bucket.prev.filter(|prev| *prev != self.sentinel);
            Some((bucket.frequency, &bucket.members))
        })
    }

    /// Drops every real bucket.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    fn bucket(&self, id: BucketId) -> Option<&Bucket<K>> {
        self.buckets.get(id.0)
    }

    fn bucket_mut(&mut self, id: BucketId) -> Option<&mut Bucket<K>> {
        self.buckets.get_mut(id.0)
    }

    fn insert_after(&mut self, prev: BucketId, frequency: u64) -> BucketId {
        let next = self.bucket(prev).and_then(|b| b.next);
        let id = BucketId(self.buckets.insert(Bucket {
            frequency,
            members: InsertionOrderedSet::new(),
            prev: Some(prev),
            next,
        }));
        if let Some(prev_bucket) = self.bucket_mut(prev) {
            prev_bucket.next = Some(id);
        }
        match next {
            Some(next) => {
                if let Some(next_bucket) = self.bucket_mut(next) {
                    next_bucket.prev = Some(id);
                }
            },
            None => self.last = id,
        }
        id
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let sentinel = self.bucket(self.sentinel).expect("sentinel missing");
        assert_eq!(sentinel.frequency, 0);
        assert!(sentinel.prev.is_none());
        assert!(sentinel.members.is_empty());

        let mut prev = self.sentinel;
        let mut prev_frequency = 0u64;
        let mut cursor = sentinel.next;
        let mut count = 0usize;
        while let Some(id) = cursor {
            let bucket = self.bucket(id).expect("linked bucket missing");
            assert_eq!(bucket.prev, Some(prev));
            assert!(bucket.frequency > prev_frequency, "frequencies must increase");
            assert!(!bucket.members.is_empty(), "empty bucket left linked");
            bucket.members.debug_validate_invariants();
            prev = id;
            prev_frequency = bucket.frequency;
            cursor = bucket.next;
            count += 1;
        }
        assert_eq!(self.last, prev);
        assert_eq!(count, self.bucket_count());
    }
}

impl<K> Default for FrequencyLedger<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain<K: Eq + Hash + Clone>(ledger: &FrequencyLedger<K>) -> Vec<(u64, Vec<K>)> {
        let mut buckets: Vec<_> = ledger
            .iter_desc()
            .map(|(f, members)| (f, members.elements().cloned().collect()))
            .collect();
        buckets.reverse();
        buckets
    }

    #[test]
    fn empty_ledger_has_only_sentinel() {
        let ledger: FrequencyLedger<&str> = FrequencyLedger::new();
        assert_eq!(ledger.lowest(), None);
        assert_eq!(ledger.bucket_count(), 0);
        assert_eq!(ledger.frequency(ledger.sentinel()), Some(0));
        assert_eq!(ledger.iter_desc().count(), 0);
        ledger.debug_validate_invariants();
    }

    #[test]
    fn unit_bucket_is_created_once() {
        let mut ledger = FrequencyLedger::new();
        let one = ledger.unit_bucket();
        ledger.add_member(one, "a");
        assert_eq!(ledger.unit_bucket(), one);
        assert_eq!(ledger.lowest(), Some(one));
        assert_eq!(ledger.frequency(one), Some(1));
        ledger.debug_validate_invariants();
    }

    #[test]
    fn unit_bucket_is_prepended_before_higher_frequencies() {
        let mut ledger = FrequencyLedger::new();
        let one = ledger.unit_bucket();
        ledger.add_member(one, "a");
        let two = ledger.successor(one).unwrap();
        ledger.remove_member(one, &"a");
        ledger.add_member(two, "a");
        assert!(ledger.unlink_if_empty(one));
        assert_eq!(ledger.lowest(), Some(two));

        let fresh = ledger.unit_bucket();
        assert_ne!(fresh, two);
        ledger.add_member(fresh, "b");
        assert_eq!(chain(&ledger), vec![(1, vec!["b"]), (2, vec!["a"])]);
        ledger.debug_validate_invariants();
    }

    #[test]
    fn successor_reuses_adjacent_bucket_with_exact_frequency() {
        let mut ledger = FrequencyLedger::new();
        let one = ledger.unit_bucket();
        ledger.add_member(one, "a");
        ledger.add_member(one, "b");
        let two = ledger.successor(one).unwrap();
        ledger.add_member(two, "x");
        assert_eq!(ledger.successor(one), Some(two));
        assert_eq!(ledger.bucket_count(), 2);
        ledger.debug_validate_invariants();
    }

    #[test]
    fn successor_inserts_between_non_adjacent_frequencies() {
        let mut ledger = FrequencyLedger::new();
        let one = ledger.unit_bucket();
        ledger.add_member(one, "a");
        let two = ledger.successor(one).unwrap();
        let three = ledger.successor(two).unwrap();
        ledger.add_member(three, "c");
        assert!(ledger.unlink_if_empty(two));

        ledger.add_member(one, "b");
        let new_two = ledger.successor(one).unwrap();
        assert_eq!(ledger.frequency(new_two), Some(2));
        ledger.remove_member(one, &"b");
        ledger.add_member(new_two, "b");
        assert_eq!(
            chain(&ledger),
            vec![(1, vec!["a"]), (2, vec!["b"]), (3, vec!["c"])]
        );
        ledger.debug_validate_invariants();
    }

    #[test]
    fn pop_oldest_is_fifo_within_bucket() {
        let mut ledger = FrequencyLedger::new();
        let one = ledger.unit_bucket();
        for key in ["a", "b", "c"] {
            ledger.add_member(one, key);
        }
        assert_eq!(ledger.pop_oldest(one), Some("a"));
        assert_eq!(ledger.pop_oldest(one), Some("b"));
        assert!(!ledger.unlink_if_empty(one));
        assert_eq!(ledger.pop_oldest(one), Some("c"));
        assert!(ledger.unlink_if_empty(one));
        assert_eq!(ledger.pop_oldest(one), None);
        ledger.debug_validate_invariants();
    }

    #[test]
    fn sentinel_is_never_unlinked() {
        let mut ledger: FrequencyLedger<u32> = FrequencyLedger::new();
        let sentinel = ledger.sentinel();
        assert!(!ledger.unlink_if_empty(sentinel));
        assert_eq!(ledger.frequency(sentinel), Some(0));
    }

    #[test]
    fn clear_drops_all_buckets() {
        let mut ledger = FrequencyLedger::new();
        let one = ledger.unit_bucket();
        ledger.add_member(one, 1u32);
        ledger.successor(one);
        ledger.clear();
        assert_eq!(ledger.bucket_count(), 0);
        assert_eq!(ledger.lowest(), None);
        ledger.debug_validate_invariants();
    }
}
