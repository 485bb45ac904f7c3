//! Doubly linked recency list backed by [`SlotArena`].
//!
//! Nodes live in the arena and are linked by [`SlotId`], so a node keeps the
//! same id from the moment it is pushed until it is removed. The LRU engine
//! keeps those ids in its key map and relocates nodes without reallocating.
//!
//! ```text
//!   head (most recent)                               tail (least recent)
//!     │                                                     │
//!     ▼                                                     ▼
//!   [id_4] ◄──► [id_0] ◄──► [id_2] ◄──► [id_1] ◄──► [id_3]
//! ```
//!
//! | Operation        | Time |
//! |------------------|------|
//! | `push_front`     | O(1) |
//! | `pop_back`       | O(1) |
//! | `move_to_front`  | O(1) |
//! | `remove`         | O(1) |
//! | `iter`           | O(n) |

use crate::ds::slot_arena::{SlotArena, SlotId};

#[derive(Debug)]
struct Link<T> {
    value: T,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

/// Arena-backed doubly linked list ordered from most to least recent.
#[derive(Debug)]
pub struct RecencyList<T> {
    arena: SlotArena<Link<T>>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

impl<T> RecencyList<T> {
    pub fn new() -> Self {
        Self {
            arena: SlotArena::new(),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.arena.get(id).map(|link| &link.value)
    }

    /// Inserts `value` as the most recent node.
    pub fn push_front(&mut self, value: T) -> SlotId {
        let id = self.arena.insert(Link {
            value,
            prev: None,
            next: None,
        });
        self.link_front(id);
        id
    }

    /// Unlinks and returns the least recent value.
    pub fn pop_back(&mut self) -> Option<T> {
        let id = self.tail?;
        self.remove(id)
    }

    /// Unlinks the node `id` and frees its slot.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        self.unlink(id)?;
        self.arena.remove(id).map(|link| link.value)
    }

    /// Relinks an existing node at the head; returns `false` if `id` is stale.
    pub fn move_to_front(&mut self, id: SlotId) -> bool {
        if !self.arena.contains(id) {
            return false;
        }
        if self.head != Some(id) {
            self.unlink(id);
            self.link_front(id);
        }
        true
    }

    /// Drops every node.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.head = None;
        self.tail = None;
    }

    /// Iterates values from head (most recent) to tail.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    fn unlink(&mut self, id: SlotId) -> Option<()> {
        let (prev, next) = {
            let link = self.arena.get(id)?;
            (link.prev, link.next)
        };

        match prev.and_then(|p| self.arena.get_mut(p)) {
            Some(prev_link) => prev_link.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.arena.get_mut(n)) {
            Some(next_link) => next_link.prev = prev,
            None => self.tail = prev,
        }

        let link = self.arena.get_mut(id)?;
        link.prev = None;
        link.next = None;
        Some(())
    }

    fn link_front(&mut self, id: SlotId) {
        let old_head = self.head;
        if let Some(link) = self.arena.get_mut(id) {
            link.prev = None;
            link.next = old_head;
        }
        match old_head.and_then(|h| self.arena.get_mut(h)) {
            Some(head_link) => head_link.prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if self.head.is_none() || self.tail.is_none() {
            assert!(self.head.is_none());
            assert!(self.tail.is_none());
            assert_eq!(self.len(), 0);
            return;
        }

        let mut count = 0usize;
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let link = self.arena.get(id).expect("linked node missing from arena");
            assert_eq!(link.prev, prev);
            prev = Some(id);
            cursor = link.next;
            count += 1;
            assert!(count <= self.len(), "cycle in recency list");
        }
        assert_eq!(self.tail, prev);
        assert_eq!(count, self.len());
    }
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Head-to-tail iterator over a [`RecencyList`].
pub struct Iter<'a, T> {
    list: &'a RecencyList<T>,
    cursor: Option<SlotId>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let link = self.list.arena.get(id)?;
        self.cursor = link.next;
        Some(&link.value)
    }
}
