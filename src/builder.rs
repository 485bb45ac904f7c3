//! Engine selection and construction.
//!
//! [`EngineKind`] names a strategy, [`EngineConfig`] pairs it with a capacity,
//! and [`EngineBuilder`] / [`new_engine`] produce an [`Engine`], an enum that
//! dispatches the [`CacheEngine`] contract to the chosen strategy.
//!
//! ## Example
//!
//! ```rust
//! use evictkit::builder::{EngineBuilder, EngineKind};
//! use evictkit::traits::CacheEngine;
//!
//! let mut engine = EngineBuilder::new(100)
//!     .kind(EngineKind::Lfu)
//!     .build::<String, String>();
//! engine.insert("k".to_string(), "v".to_string());
//! assert_eq!(engine.access(&"k".to_string()), Some(&"v".to_string()));
//! ```
//!
//! ## Selectors
//!
//! Engines are often chosen by a string from configuration. Two parsers are
//! offered:
//!
//! | Call                            | `"LFU"` | `"lru"` | `"arc"`            |
//! |---------------------------------|---------|---------|--------------------|
//! | `EngineKind::from_selector`     | `Lfu`   | `Lru`   | `Lru` (fallback)   |
//! | `"..".parse::<EngineKind>()`    | `Lfu`   | `Lru`   | `Err(ConfigError)` |

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::policy::lfu::LfuEngine;
use crate::policy::lru::LruEngine;
use crate::traits::{ByteLen, CacheEngine, CacheEntry, CacheKey, EvictionFn};

/// Default capacity used by [`EngineConfig::default`].
pub const DEFAULT_CAPACITY: usize = 2 << 10;

/// Available eviction strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EngineKind {
    /// Least recently used; capacity counts bytes.
    #[default]
    Lru,
    /// Least frequently used; capacity counts entries.
    Lfu,
}

impl EngineKind {
    /// Case-insensitive lookup that falls back to [`EngineKind::Lru`] for any
    /// unrecognized selector.
    pub fn from_selector(selector: &str) -> Self {
        selector.parse().unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lru => "lru",
            Self::Lfu => "lfu",
        }
    }
}

impl FromStr for EngineKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let selector = s.trim();
        if selector.eq_ignore_ascii_case("lru") {
            Ok(Self::Lru)
        } else if selector.eq_ignore_ascii_case("lfu") {
            Ok(Self::Lfu)
        } else {
            Err(ConfigError::new(format!(
                "unknown engine kind: {selector} (expected \"lru\" or \"lfu\")"
            )))
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capacity and strategy for one engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub capacity: usize,
    pub kind: EngineKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            kind: EngineKind::Lru,
        }
    }
}

impl EngineConfig {
    pub fn build<K, V>(self) -> Engine<K, V>
    where
        K: CacheKey,
        V: ByteLen,
    {
        new_engine(self.capacity, self.kind)
    }
}

/// Builder for [`Engine`] instances.
#[derive(Debug, Clone, Copy)]
pub struct EngineBuilder {
    config: EngineConfig,
}

impl EngineBuilder {
    /// Starts an LRU builder with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            config: EngineConfig {
                capacity,
                kind: EngineKind::Lru,
            },
        }
    }

    pub fn kind(mut self, kind: EngineKind) -> Self {
        self.config.kind = kind;
        self
    }

    /// Sets the strategy from a selector string, see [`EngineKind::from_selector`].
    pub fn selector(self, selector: &str) -> Self {
        self.kind(EngineKind::from_selector(selector))
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Builds the engine.
    ///
    /// ```rust
    /// use evictkit::builder::{EngineBuilder, EngineKind};
    /// use evictkit::traits::CacheEngine;
    ///
    /// let lru = EngineBuilder::new(64).build::<String, Vec<u8>>();
    /// assert_eq!(lru.kind(), EngineKind::Lru);
    ///
    /// let lfu = EngineBuilder::new(64).selector("LFU").build::<u64, u64>();
    /// assert_eq!(lfu.kind(), EngineKind::Lfu);
    /// assert_eq!(lfu.capacity(), 64);
    /// ```
    pub fn build<K, V>(self) -> Engine<K, V>
    where
        K: CacheKey,
        V: ByteLen,
    {
        self.config.build()
    }
}

/// Creates an engine of the given kind.
pub fn new_engine<K, V>(capacity: usize, kind: EngineKind) -> Engine<K, V>
where
    K: CacheKey,
    V: ByteLen,
{
    match kind {
        EngineKind::Lru => Engine::Lru(LruEngine::new(capacity)),
        EngineKind::Lfu => Engine::Lfu(LfuEngine::new(capacity)),
    }
}

/// Strategy-erased engine.
#[derive(Debug)]
pub enum Engine<K, V>
where
    K: CacheKey,
    V: ByteLen,
{
    Lru(LruEngine<K, V>),
    Lfu(LfuEngine<K, V>),
}

impl<K, V> Engine<K, V>
where
    K: CacheKey,
    V: ByteLen,
{
    pub fn kind(&self) -> EngineKind {
        match self {
            Self::Lru(_) => EngineKind::Lru,
            Self::Lfu(_) => EngineKind::Lfu,
        }
    }

    /// Reads a value without recency or frequency bookkeeping.
    pub fn peek(&self, key: &K) -> Option<&V> {
        match self {
            Self::Lru(lru) => lru.peek(key),
            Self::Lfu(lfu) => lfu.peek(key),
        }
    }

    /// Access frequency of `key`; `None` for LRU engines and absent keys.
    pub fn freq_key(&self, key: &K) -> Option<u64> {
        match self {
            Self::Lru(_) => None,
            Self::Lfu(lfu) => lfu.freq_key(key),
        }
    }
}

impl<K, V> CacheEngine<K, V> for Engine<K, V>
where
    K: CacheKey,
    V: ByteLen,
{
    fn insert(&mut self, key: K, value: V) -> bool {
        match self {
            Self::Lru(lru) => lru.insert(key, value),
            Self::Lfu(lfu) => lfu.insert(key, value),
        }
    }

    fn access(&mut self, key: &K) -> Option<&V> {
        match self {
            Self::Lru(lru) => lru.access(key),
            Self::Lfu(lfu) => lfu.access(key),
        }
    }

    fn size(&self) -> usize {
        match self {
            Self::Lru(lru) => lru.size(),
            Self::Lfu(lfu) => lfu.size(),
        }
    }

    fn dump(&self) -> Vec<CacheEntry<&K, &V>> {
        match self {
            Self::Lru(lru) => lru.dump(),
            Self::Lfu(lfu) => lfu.dump(),
        }
    }

    fn on_evict(&mut self, callback: EvictionFn<K, V>) {
        match self {
            Self::Lru(lru) => lru.on_evict(callback),
            Self::Lfu(lfu) => lfu.on_evict(callback),
        }
    }

    fn contains(&self, key: &K) -> bool {
        match self {
            Self::Lru(lru) => lru.contains(key),
            Self::Lfu(lfu) => lfu.contains(key),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Lru(lru) => lru.len(),
            Self::Lfu(lfu) => lfu.len(),
        }
    }

    fn capacity(&self) -> usize {
        match self {
            Self::Lru(lru) => lru.capacity(),
            Self::Lfu(lfu) => lfu.capacity(),
        }
    }

    fn free(&mut self) {
        match self {
            Self::Lru(lru) => lru.free(),
            Self::Lfu(lfu) => lfu.free(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_is_lenient() {
        assert_eq!(EngineKind::from_selector("lfu"), EngineKind::Lfu);
        assert_eq!(EngineKind::from_selector("LFU"), EngineKind::Lfu);
        assert_eq!(EngineKind::from_selector(" Lru "), EngineKind::Lru);
        assert_eq!(EngineKind::from_selector("arc"), EngineKind::Lru);
        assert_eq!(EngineKind::from_selector(""), EngineKind::Lru);
    }

    #[test]
    fn parse_is_strict() {
        assert_eq!("lru".parse::<EngineKind>(), Ok(EngineKind::Lru));
        assert_eq!("Lfu".parse::<EngineKind>(), Ok(EngineKind::Lfu));
        let err = "clock".parse::<EngineKind>().unwrap_err();
        assert!(err.message().contains("clock"));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for kind in [EngineKind::Lru, EngineKind::Lfu] {
            assert_eq!(kind.to_string().parse::<EngineKind>(), Ok(kind));
        }
    }

    #[test]
    fn default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.capacity, 2048);
        assert_eq!(config.kind, EngineKind::Lru);

        let engine = config.build::<String, String>();
        assert_eq!(engine.capacity(), 2048);
        assert_eq!(engine.kind(), EngineKind::Lru);
    }

    #[test]
    fn factory_builds_requested_kind() {
        let lru: Engine<u32, u32> = new_engine(10, EngineKind::Lru);
        let lfu: Engine<u32, u32> = new_engine(10, EngineKind::Lfu);
        assert!(matches!(lru, Engine::Lru(_)));
        assert!(matches!(lfu, Engine::Lfu(_)));
    }

    #[test]
    fn size_semantics_follow_kind() {
        let mut lru = EngineBuilder::new(0).build::<String, String>();
        let mut lfu = EngineBuilder::new(0)
            .kind(EngineKind::Lfu)
            .build::<String, String>();
        for engine in [&mut lru, &mut lfu] {
            engine.insert("ab".into(), "cde".into());
            engine.insert("f".into(), "g".into());
        }
        assert_eq!(lru.size(), 7);
        assert_eq!(lfu.size(), 2);
    }

    #[test]
    fn peek_and_freq_key_dispatch() {
        let mut lfu = new_engine::<&str, u8>(0, EngineKind::Lfu);
        lfu.insert("a", 1);
        lfu.access(&"a");
        assert_eq!(lfu.peek(&"a"), Some(&1));
        assert_eq!(lfu.freq_key(&"a"), Some(2));

        let mut lru = new_engine::<&str, u8>(0, EngineKind::Lru);
        lru.insert("a", 1);
        assert_eq!(lru.peek(&"a"), Some(&1));
        assert_eq!(lru.freq_key(&"a"), None);
    }

    #[test]
    fn builder_config_reflects_settings() {
        let builder = EngineBuilder::new(5).selector("lfu");
        assert_eq!(
            builder.config(),
            EngineConfig {
                capacity: 5,
                kind: EngineKind::Lfu,
            }
        );
    }
}
