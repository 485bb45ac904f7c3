//! Lock-guarded engine handle for shared use across threads.
//!
//! [`SharedEngine`] serializes every operation on one [`Engine`] through a
//! single `parking_lot::RwLock`:
//!
//! | Operation                           | Lock      |
//! |-------------------------------------|-----------|
//! | `add`, `get`, `free`, `on_evict`    | exclusive |
//! | `peek`, `contains`, `size`, `len`, `snapshot` | shared |
//!
//! `get` takes the exclusive lock because an access updates recency or
//! frequency bookkeeping. Values are cloned out so no guard escapes.
//!
//! Unlike the in-band [`CacheEngine`] contract, duplicate inserts and misses
//! surface here as [`CacheError`] values, and each outcome is traced with the
//! `key` and resulting `size` as structured fields.
//!
//! ```
//! use std::sync::Arc;
//!
//! use evictkit::builder::{EngineBuilder, EngineKind};
//! use evictkit::error::CacheError;
//! use evictkit::sync::SharedEngine;
//!
//! let engine = Arc::new(SharedEngine::new(
//!     EngineBuilder::new(16).kind(EngineKind::Lfu).build::<String, String>(),
//! ));
//! engine.add("k".into(), "v".into()).unwrap();
//! assert_eq!(engine.get(&"k".into()), Ok("v".to_string()));
//! assert!(matches!(
//!     engine.add("k".into(), "other".into()),
//!     Err(CacheError::DuplicateKey { .. })
//! ));
//! ```

use std::fmt;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::builder::{Engine, EngineConfig, EngineKind};
use crate::error::CacheError;
use crate::traits::{ByteLen, CacheEngine, CacheEntry, CacheKey, EvictionFn};

/// An [`Engine`] behind a reader/writer lock.
pub struct SharedEngine<K, V>
where
    K: CacheKey,
    V: ByteLen,
{
    inner: RwLock<Engine<K, V>>,
}

impl<K, V> SharedEngine<K, V>
where
    K: CacheKey + fmt::Debug,
    V: ByteLen + Clone,
{
    pub fn new(engine: Engine<K, V>) -> Self {
        Self {
            inner: RwLock::new(engine),
        }
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::new(config.build())
    }

    /// Inserts `key`, reporting an existing key as [`CacheError::DuplicateKey`].
    pub fn add(&self, key: K, value: V) -> Result<(), CacheError> {
        let mut engine = self.inner.write();
        if engine.contains(&key) {
            // Still applies the strategy's duplicate-insert bookkeeping.
            engine.insert(key.clone(), value);
            debug!(key = ?key, size = engine.size(), "duplicate insert rejected");
            return Err(CacheError::duplicate_key(&key));
        }
        engine.insert(key.clone(), value);
        trace!(key = ?key, size = engine.size(), "insert");
        Ok(())
    }

    /// Reads and clones a value, applying access bookkeeping.
    pub fn get(&self, key: &K) -> Result<V, CacheError> {
        let mut engine = self.inner.write();
        let value = engine.access(key).cloned();
        match value {
            Some(value) => {
                trace!(key = ?key, size = engine.size(), "cache hit");
                Ok(value)
            },
            None => {
                trace!(key = ?key, size = engine.size(), "cache miss");
                Err(CacheError::not_found(key))
            },
        }
    }

    /// Reads and clones a value without bookkeeping.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.inner.read().peek(key).cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.read().contains(key)
    }

    pub fn size(&self) -> usize {
        self.inner.read().size()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.read().capacity()
    }

    pub fn kind(&self) -> EngineKind {
        self.inner.read().kind()
    }

    /// Owned copy of the engine's dump, in the engine's priority order.
    pub fn snapshot(&self) -> Vec<CacheEntry<K, V>> {
        self.inner
            .read()
            .dump()
            .iter()
            .map(CacheEntry::to_owned_entry)
            .collect()
    }

    /// Drops every entry without eviction callbacks.
    pub fn free(&self) {
        self.inner.write().free();
        debug!("engine freed");
    }

    /// Registers the eviction callback.
    ///
    /// The callback runs while the exclusive lock is held and must not call
    /// back into this handle.
    pub fn on_evict(&self, callback: EvictionFn<K, V>) {
        self.inner.write().on_evict(callback);
    }
}

impl<K, V> From<Engine<K, V>> for SharedEngine<K, V>
where
    K: CacheKey + fmt::Debug,
    V: ByteLen + Clone,
{
    fn from(engine: Engine<K, V>) -> Self {
        Self::new(engine)
    }
}

impl<K, V> Default for SharedEngine<K, V>
where
    K: CacheKey + fmt::Debug,
    V: ByteLen + Clone,
{
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

impl<K, V> fmt::Debug for SharedEngine<K, V>
where
    K: CacheKey,
    V: ByteLen,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let engine = self.inner.read();
        f.debug_struct("SharedEngine")
            .field("kind", &engine.kind())
            .field("len", &engine.len())
            .field("size", &engine.size())
            .finish()
    }
}
