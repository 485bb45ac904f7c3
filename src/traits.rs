//! # Cache Engine Contract
//!
//! One trait, [`CacheEngine`], is implemented by every eviction strategy so
//! that callers can swap strategies without touching call sites.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌─────────────────────────────────────────────┐
//!                 │             CacheEngine<K, V>               │
//!                 │                                             │
//!                 │  insert(&mut, K, V) → bool                  │
//!                 │  access(&mut, &K) → Option<&V>              │
//!                 │  size(&) → usize                            │
//!                 │  dump(&) → Vec<CacheEntry<&K, &V>>          │
//!                 │  on_evict(&mut, EvictionFn<K, V>)           │
//!                 │  contains / len / capacity / free           │
//!                 └──────────────────────┬──────────────────────┘
//!                                        │
//!            ┌───────────────────────────┼───────────────────────────┐
//!            ▼                           ▼                           ▼
//!   ┌──────────────────┐       ┌──────────────────┐       ┌──────────────────┐
//!   │  LruEngine<K,V>  │       │  LfuEngine<K,V>  │       │   Engine<K,V>    │
//!   │  size = bytes    │       │  size = entries  │       │  (enum dispatch) │
//!   └──────────────────┘       └──────────────────┘       └──────────────────┘
//! ```
//!
//! ## Sizing
//!
//! Every entry carries a byte length of `key.byte_len() + value.byte_len()`,
//! computed once on insert. [`ByteLen`] supplies the per-type measure and
//! [`CacheKey`] is the bound placed on keys.
//!
//! | Strategy | `size()` measures       | Bounded by `capacity` as |
//! |----------|-------------------------|--------------------------|
//! | LRU      | sum of entry byte lens  | bytes                    |
//! | LFU      | number of entries       | entries                  |
//!
//! ## Eviction Callback
//!
//! The callback registered with [`CacheEngine::on_evict`] runs synchronously
//! inside the `insert` that caused the eviction, after the victim has been
//! unlinked. It fires exactly once per policy eviction and never for
//! [`CacheEngine::free`].
//!
//! ## Thread Safety
//!
//! Engines are plain `&mut self` structures. Share one across threads through
//! [`SharedEngine`](crate::sync::SharedEngine) or an equivalent lock.

use std::hash::Hash;
use std::rc::Rc;
use std::sync::Arc;

/// Size of a value in bytes, as counted against a byte-bounded capacity.
pub trait ByteLen {
    fn byte_len(&self) -> usize;
}

impl ByteLen for str {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl ByteLen for String {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl ByteLen for [u8] {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl ByteLen for Vec<u8> {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl<T: ByteLen + ?Sized> ByteLen for &T {
    fn byte_len(&self) -> usize {
        (**self).byte_len()
    }
}

impl<T: ByteLen + ?Sized> ByteLen for Box<T> {
    fn byte_len(&self) -> usize {
        (**self).byte_len()
    }
}

impl<T: ByteLen + ?Sized> ByteLen for Arc<T> {
    fn byte_len(&self) -> usize {
        (**self).byte_len()
    }
}

impl<T: ByteLen + ?Sized> ByteLen for Rc<T> {
    fn byte_len(&self) -> usize {
        (**self).byte_len()
    }
}

macro_rules! byte_len_by_size {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ByteLen for $ty {
                #[inline]
                fn byte_len(&self) -> usize {
                    std::mem::size_of::<$ty>()
                }
            }
        )*
    };
}

byte_len_by_size!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, char);

/// Bound placed on engine keys: hashable, comparable, cloneable, sized in bytes.
pub trait CacheKey: Eq + Hash + Clone + ByteLen {}

impl<T> CacheKey for T where T: Eq + Hash + Clone + ByteLen {}

/// A cached key/value pair together with its accounted byte length.
///
/// [`CacheEngine::dump`] yields borrowed entries (`CacheEntry<&K, &V>`); the
/// eviction callback receives owned ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<K, V> {
    pub key: K,
    pub value: V,
    pub byte_len: usize,
}

impl<K: ByteLen, V: ByteLen> CacheEntry<K, V> {
    /// Builds an entry, measuring `key.byte_len() + value.byte_len()`.
    pub fn new(key: K, value: V) -> Self {
        let byte_len = key.byte_len() + value.byte_len();
        Self {
            key,
            value,
            byte_len,
        }
    }
}

impl<K: Clone, V: Clone> CacheEntry<&K, &V> {
    /// Clones a borrowed dump entry into an owned one.
    pub fn to_owned_entry(&self) -> CacheEntry<K, V> {
        CacheEntry {
            key: self.key.clone(),
            value: self.value.clone(),
            byte_len: self.byte_len,
        }
    }
}

/// Callback invoked with each entry removed by policy eviction.
pub type EvictionFn<K, V> = Box<dyn FnMut(CacheEntry<K, V>) + Send + Sync>;

/// Operations shared by every eviction strategy.
///
/// Duplicate inserts and misses are reported in-band: `insert` returns
/// `false` and leaves the stored value untouched, `access` returns `None`.
///
/// # Example
///
/// ```
/// use evictkit::policy::lru::LruEngine;
/// use evictkit::traits::CacheEngine;
///
/// fn warm<E: CacheEngine<String, String>>(engine: &mut E, data: &[(&str, &str)]) {
///     for (key, value) in data {
///         engine.insert(key.to_string(), value.to_string());
///     }
/// }
///
/// let mut engine = LruEngine::new(1024);
/// warm(&mut engine, &[("a", "1"), ("b", "2")]);
/// assert_eq!(engine.len(), 2);
/// assert_eq!(engine.size(), 4);
/// ```
pub trait CacheEngine<K, V> {
    /// Inserts a new entry, evicting at most one victim first if needed.
    ///
    /// Returns `false` (and changes no stored value) if `key` is already
    /// present.
    ///
    /// ```
    /// use evictkit::policy::lru::LruEngine;
    /// use evictkit::traits::CacheEngine;
    ///
    /// let mut engine = LruEngine::new(0);
    /// assert!(engine.insert("k", "first"));
    /// assert!(!engine.insert("k", "second"));
    /// assert_eq!(engine.access(&"k"), Some(&"first"));
    /// ```
    fn insert(&mut self, key: K, value: V) -> bool;

    /// Reads a value, applying the strategy's bookkeeping (recency promotion
    /// or frequency increment).
    fn access(&mut self, key: &K) -> Option<&V>;

    /// Aggregate measure compared against [`capacity`](Self::capacity).
    fn size(&self) -> usize;

    /// Entries ordered most-prioritized first.
    fn dump(&self) -> Vec<CacheEntry<&K, &V>>;

    /// Registers the eviction callback, replacing any previous one.
    fn on_evict(&mut self, callback: EvictionFn<K, V>);

    /// Checks presence without bookkeeping side effects.
    fn contains(&self, key: &K) -> bool;

    /// Number of entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured bound; `0` means unbounded.
    fn capacity(&self) -> usize;

    /// Drops every entry without invoking the eviction callback.
    fn free(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_len_of_text_and_bytes() {
        assert_eq!("abc".byte_len(), 3);
        assert_eq!(String::from("hello").byte_len(), 5);
        assert_eq!(vec![0u8; 7].byte_len(), 7);
        assert_eq!(b"xy"[..].byte_len(), 2);
    }

    #[test]
    fn byte_len_through_pointers() {
        let s = "four";
        assert_eq!((&s).byte_len(), 4);
        assert_eq!(Box::new(String::from("ab")).byte_len(), 2);
        let shared: Arc<str> = Arc::from("shared");
        assert_eq!(shared.byte_len(), 6);
        assert_eq!(Rc::new(vec![1u8, 2]).byte_len(), 2);
    }

    #[test]
    fn byte_len_of_integers_is_width() {
        assert_eq!(1u8.byte_len(), 1);
        assert_eq!(1u32.byte_len(), 4);
        assert_eq!((-1i64).byte_len(), 8);
        assert_eq!('x'.byte_len(), 4);
    }

    #[test]
    fn entry_new_sums_key_and_value() {
        let entry = CacheEntry::new("key", String::from("value"));
        assert_eq!(entry.byte_len, 8);

        let key = String::from("a");
        let value = String::from("1");
        let borrowed = CacheEntry {
            key: &key,
            value: &value,
            byte_len: 2,
        };
        assert_eq!(
            borrowed.to_owned_entry(),
            CacheEntry {
                key: String::from("a"),
                value: String::from("1"),
                byte_len: 2,
            }
        );
    }

    #[test]
    fn cache_key_blanket_covers_common_keys() {
        fn assert_key<K: CacheKey>() {}
        assert_key::<String>();
        assert_key::<&'static str>();
        assert_key::<u64>();
        assert_key::<Vec<u8>>();
    }
}
