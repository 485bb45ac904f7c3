//! Thread-shared building blocks, available with the `concurrency` feature.

pub mod shared;
pub mod single_flight;

pub use shared::SharedEngine;
pub use single_flight::SingleFlight;
