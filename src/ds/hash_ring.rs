//! Consistent-hash ring with virtual replicas.
//!
//! Each node is placed on the ring `replicas` times. Replica `i` (counting
//! from 1) of node `name` sits at `hash(format!("{i}{name}"))`. A key is owned
//! by the first point clockwise from `hash(key)`, wrapping to the lowest point
//! past the top of the hash space.
//!
//! ```text
//!                        hash(key) = 17
//!                              │
//!   points:  [ 11 ][ 12 ][ 13 ]│[ 21 ][ 22 ][ 23 ]
//!                                 ▲  first point >= hash(key)
//!                                 │
//!   owners:  21 → "1"    (hash collisions: last writer wins)
//! ```
//!
//! Placement is a pure function of the hasher, the replica count and the set
//! of nodes, so two rings built the same way agree on every key. Adding one
//! node to `n` existing nodes moves roughly `1 / (n + 1)` of the key space.
//!
//! The ring itself is not synchronized. Mutate it before sharing, or wrap it in
//! a lock; `get` only needs `&self`.
//!
//! ## Example
//!
//! ```
//! use evictkit::ds::{Crc32, HashRing};
//!
//! let mut ring = HashRing::new(Crc32, 50);
//! ring.add_nodes(["cache-a", "cache-b", "cache-c"]);
//!
//! let owner = ring.get("user:42").unwrap();
//! assert_eq!(ring.get("user:42"), Some(owner));
//! ```

use rustc_hash::FxHashMap;

/// Maps bytes to a position on the ring.
pub trait RingHasher {
    fn hash(&self, data: &[u8]) -> u32;
}

impl<F> RingHasher for F
where
    F: Fn(&[u8]) -> u32,
{
    fn hash(&self, data: &[u8]) -> u32 {
        self(data)
    }
}

/// IEEE CRC-32 checksum.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc32;

impl RingHasher for Crc32 {
    fn hash(&self, data: &[u8]) -> u32 {
        crc32fast::hash(data)
    }
}

/// First four bytes of the MD5 digest, read little-endian.
#[derive(Debug, Clone, Copy, Default)]
pub struct Md5;

impl RingHasher for Md5 {
    fn hash(&self, data: &[u8]) -> u32 {
        let md5::Digest(bytes) = md5::compute(data);
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

/// Sorted ring of replica points owned by named nodes.
#[derive(Debug, Clone)]
pub struct HashRing<H = Crc32> {
    hasher: H,
    replicas: usize,
    points: Vec<u32>,
    owners: FxHashMap<u32, String>,
}

impl<H: RingHasher> HashRing<H> {
    /// Creates an empty ring placing `replicas` points per node.
    pub fn new(hasher: H, replicas: usize) -> Self {
        Self {
            hasher,
            replicas,
            points: Vec::new(),
            owners: FxHashMap::default(),
        }
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }

    /// Number of points on the ring (duplicates from hash collisions included).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Places every replica of every named node on the ring.
    pub fn add_nodes<I, S>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for node in nodes {
            let node = node.as_ref();
            for replica in 1..=self.replicas {
                let point = self.point_for(replica, node);
                self.points.push(point);
                self.owners.insert(point, node.to_owned());
            }
        }
        self.points.sort_unstable();
    }

    /// Removes every replica point currently owned by `node`.
    ///
    /// A point whose owner was overwritten by a later colliding node belongs to
    /// that later node and is left alone. Returns `true` if the node owned at
    /// least one point.
    pub fn remove_node(&mut self, node: &str) -> bool {
        let mut removed = false;
        for replica in 1..=self.replicas {
            let point = self.point_for(replica, node);
            if self.owners.get(&point).is_none_or(|owner| owner != node) {
                continue;
            }
            self.owners.remove(&point);
            let start = self.points.partition_point(|&p| p < point);
            let end = self.points.partition_point(|&p| p <= point);
            self.points.drain(start..end);
            removed = true;
        }
        removed
    }

    /// Returns the node owning `key`, or `None` if the ring is empty.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&str> {
        if self.points.is_empty() {
            return None;
        }
        let hash = self.hasher.hash(key.as_ref());
        let idx = self.points.partition_point(|&point| point < hash);
        let point = self.points[idx % self.points.len()];
        self.owners.get(&point).map(String::as_str)
    }

    /// Distinct node names currently owning at least one point, sorted.
    pub fn nodes(&self) -> Vec<&str> {
        let mut nodes: Vec<&str> = self.owners.values().map(String::as_str).collect();
        nodes.sort_unstable();
        nodes.dedup();
        nodes
    }

    fn point_for(&self, replica: usize, node: &str) -> u32 {
        self.hasher.hash(format!("{replica}{node}").as_bytes())
    }
}
