//! Error types for evictkit.
//!
//! ## Key Components
//!
//! - [`CacheError`]: explicit form of the two in-band engine conditions
//!   (duplicate insert, missing key), returned by
//!   [`SharedEngine`](crate::sync::SharedEngine).
//! - [`ConfigError`]: returned by strict engine-selector parsing.
//!
//! The [`CacheEngine`](crate::traits::CacheEngine) contract itself never
//! returns these: `insert` reports a duplicate as `false` and `access` reports
//! a miss as `None`.
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::builder::EngineKind;
//! use evictkit::error::ConfigError;
//!
//! let kind: Result<EngineKind, ConfigError> = "lfu".parse();
//! assert_eq!(kind, Ok(EngineKind::Lfu));
//!
//! let bad = "arc".parse::<EngineKind>().unwrap_err();
//! assert!(bad.to_string().contains("arc"));
//! ```

use thiserror::Error;

/// Recoverable, caller-local engine conditions.
///
/// Keys are carried in their `Debug` rendering so the error stays independent
/// of the key type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// `insert` hit a key that is already cached; the stored value is unchanged.
    #[error("key {key} is already cached")]
    DuplicateKey { key: String },

    /// `access` or `peek` found no entry for the key.
    #[error("key {key} not found")]
    NotFound { key: String },
}

impl CacheError {
    pub fn duplicate_key(key: &impl std::fmt::Debug) -> Self {
        Self::DuplicateKey {
            key: format!("{key:?}"),
        }
    }

    pub fn not_found(key: &impl std::fmt::Debug) -> Self {
        Self::NotFound {
            key: format!("{key:?}"),
        }
    }

    /// Returns `true` for [`CacheError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Error returned when engine configuration is invalid.
///
/// Carries a human-readable description of which parameter failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}
