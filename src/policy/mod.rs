pub mod lfu;
pub mod lru;

pub use lfu::LfuEngine;
pub use lru::LruEngine;
