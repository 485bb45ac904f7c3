//! Insertion-ordered set with O(1) add, remove and pop-oldest.
//!
//! Each LFU frequency bucket owns one of these so that, among keys sharing a
//! frequency, the one that entered the bucket first is evicted first.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<T, SlotId>          arena: SlotArena<Member<T>>
//!   ┌─────┬────────┐
//!   │ "c" │ id_3   │──┐
//!   │ "b" │ id_2   │──┼──┐
//!   │ "a" │ id_1   │──┼──┼──┐
//!   └─────┴────────┘  │  │  │
//!                     ▼  ▼  ▼
//!   [sentinel] ──► [c] ◄──► [b] ◄──► [a]
//!      id_0       newest              oldest
//!                                      ▲
//!                                   tail ┘
//! ```
//!
//! New members are linked directly after the sentinel; `tail` always points at
//! the oldest member, or at the sentinel when the set is empty. Every unlink
//! that removes the tail moves `tail` back to the predecessor.
//!
//! ## Example
//!
//! ```
//! use evictkit::ds::InsertionOrderedSet;
//!
//! let mut set = InsertionOrderedSet::new();
//! set.add("a");
//! set.add("b");
//! set.add("c");
//! set.add("a"); // already present, position unchanged
//!
//! assert_eq!(set.elements().copied().collect::<Vec<_>>(), vec!["c", "b", "a"]);
//! assert_eq!(set.pop_oldest(), Some("a"));
//! assert_eq!(set.len(), 2);
//! ```

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::slot_arena::{SlotArena, SlotId};

#[derive(Debug)]
struct Member<T> {
    /// `None` only for the sentinel.
    value: Option<T>,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

/// Set of unique values that remembers insertion order.
#[derive(Debug)]
pub struct InsertionOrderedSet<T> {
    index: FxHashMap<T, SlotId>,
    arena: SlotArena<Member<T>>,
    sentinel: SlotId,
    tail: SlotId,
}

impl<T> InsertionOrderedSet<T>
where
    T: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut arena = SlotArena::with_capacity(capacity + 1);
        let sentinel = arena.insert(Member {
            value: None,
            prev: None,
            next: None,
        });
        Self {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            arena,
            sentinel,
            tail: sentinel,
        }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, value: &T) -> bool {
        self.index.contains_key(value)
    }

    /// Adds `value` as the newest member.
    ///
    /// Returns `false`, leaving the set untouched, if `value` is already a
    /// member.
    pub fn add(&mut self, value: T) -> bool {
        if self.index.contains_key(&value) {
            return false;
        }

        let first = self.arena.get(self.sentinel).and_then(|s| s.next);
        let id = self.arena.insert(Member {
            value: Some(value.clone()),
            prev: Some(self.sentinel),
            next: first,
        });
        match first.and_then(|f| self.arena.get_mut(f)) {
            Some(first_member) => first_member.prev = Some(id),
            None => self.tail = id,
        }
        if let Some(sentinel) = self.arena.get_mut(self.sentinel) {
            sentinel.next = Some(id);
        }
        self.index.insert(value, id);
        true
    }

    /// Removes `value`; returns `false` if it was not a member.
    pub fn remove(&mut self, value: &T) -> bool {
        match self.index.remove(value) {
            Some(id) => {
                self.unlink(id);
                true
            },
            None => false,
        }
    }

    /// Removes and returns the earliest-inserted member.
    pub fn pop_oldest(&mut self) -> Option<T> {
        if self.tail == self.sentinel {
            return None;
        }
        let id = self.tail;
        let value = self.unlink(id)?;
        self.index.remove(&value);
        Some(value)
    }

    /// Returns the earliest-inserted member without removing it.
    pub fn peek_oldest(&self) -> Option<&T> {
        if self.tail == self.sentinel {
            return None;
        }
        self.arena.get(self.tail).and_then(|m| m.value.as_ref())
    }

    /// Iterates members from newest to oldest.
    ///
    /// The iterator borrows the set and is single-pass; call `elements` again
    /// to walk the set a second time.
    pub fn elements(&self) -> Elements<'_, T> {
        Elements {
            arena: &self.arena,
            cursor: self.arena.get(self.sentinel).and_then(|s| s.next),
            remaining: self.len(),
        }
    }

    /// Removes every member, keeping the sentinel.
    pub fn clear(&mut self) {
        self.index.clear();
        self.arena.clear();
        self.sentinel = self.arena.insert(Member {
            value: None,
            prev: None,
            next: None,
        });
        self.tail = self.sentinel;
    }

    fn unlink(&mut self, id: SlotId) -> Option<T> {
        let member = self.arena.remove(id)?;
        let prev = member.prev.unwrap_or(self.sentinel);

        if let Some(prev_member) = self.arena.get_mut(prev) {
            prev_member.next = member.next;
        }
        match member.next.and_then(|n| self.arena.get_mut(n)) {
            Some(next_member) => next_member.prev = Some(prev),
            None => self.tail = prev,
        }
        member.value
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.arena.len(), self.index.len() + 1);

        let sentinel = self.arena.get(self.sentinel).expect("sentinel missing");
        assert!(sentinel.value.is_none());
        assert!(sentinel.prev.is_none());

        let mut prev = self.sentinel;
        let mut cursor = sentinel.next;
        let mut count = 0usize;
        while let Some(id) = cursor {
            let member = self.arena.get(id).expect("linked member missing");
            assert_eq!(member.prev, Some(prev));
            let value = member.value.as_ref().expect("member without value");
            assert_eq!(self.index.get(value), Some(&id));
            prev = id;
            cursor = member.next;
            count += 1;
            assert!(count <= self.len(), "cycle in ordered set");
        }
        assert_eq!(self.tail, prev);
        assert_eq!(count, self.len());
    }
}

impl<T> Default for InsertionOrderedSet<T>
where
    T: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Newest-first iterator returned by [`InsertionOrderedSet::elements`].
pub struct Elements<'a, T> {
    arena: &'a SlotArena<Member<T>>,
    cursor: Option<SlotId>,
    remaining: usize,
}

impl<'a, T> Iterator for Elements<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let member = self.arena.get(id)?;
        self.cursor = member.next;
        self.remaining = self.remaining.saturating_sub(1);
        member.value.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Elements<'_, T> {}
