pub mod frequency_ledger;
pub mod hash_ring;
pub mod ordered_set;
pub mod recency_list;
pub mod slot_arena;

pub use frequency_ledger::{BucketId, FrequencyLedger};
pub use hash_ring::{Crc32, HashRing, Md5, RingHasher};
pub use ordered_set::InsertionOrderedSet;
pub use recency_list::RecencyList;
pub use slot_arena::{SlotArena, SlotId};
