//! evictkit: in-process cache engines (LRU, LFU) behind one contract, plus a
//! consistent-hash ring and single-flight call coalescing.
//!
//! See `DESIGN.md` for module layout and invariants.

pub mod builder;
pub mod ds;
pub mod error;
pub mod policy;
pub mod prelude;
#[cfg(feature = "concurrency")]
pub mod sync;
pub mod traits;
pub mod value;
