pub use crate::builder::{Engine, EngineBuilder, EngineConfig, EngineKind, new_engine};
pub use crate::ds::{Crc32, HashRing, InsertionOrderedSet, Md5, RingHasher};
pub use crate::error::{CacheError, ConfigError};
pub use crate::policy::{LfuEngine, LruEngine};
#[cfg(feature = "concurrency")]
pub use crate::sync::{SharedEngine, SingleFlight};
pub use crate::traits::{ByteLen, CacheEngine, CacheEntry, CacheKey, EvictionFn};
pub use crate::value::ByteView;
