//! Immutable byte-buffer value type.
//!
//! [`ByteView`] is the stored value for byte-oriented engines. Clones share
//! one allocation; readers that want to own or mutate the bytes take a
//! defensive copy with [`ByteView::to_vec`].
//!
//! ```
//! use evictkit::policy::lru::LruEngine;
//! use evictkit::traits::CacheEngine;
//! use evictkit::value::ByteView;
//!
//! let mut engine = LruEngine::new(64);
//! engine.insert("greeting".to_string(), ByteView::from("hello"));
//!
//! let mut copy = engine.access(&"greeting".to_string()).unwrap().to_vec();
//! copy[0] = b'J';
//! assert_eq!(engine.peek(&"greeting".to_string()).unwrap().as_bytes(), b"hello");
//! ```

use std::fmt;
use std::sync::Arc;

use crate::traits::ByteLen;

/// Cheaply cloneable, read-only bytes.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ByteView {
    bytes: Arc<[u8]>,
}

impl ByteView {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrows the underlying bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns an owned copy that does not alias the cached buffer.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }
}

impl ByteLen for ByteView {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl AsRef<[u8]> for ByteView {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for ByteView {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl From<&str> for ByteView {
    fn from(text: &str) -> Self {
        Self::new(text.as_bytes())
    }
}

impl From<String> for ByteView {
    fn from(text: String) -> Self {
        Self::new(text.into_bytes())
    }
}

/// Renders the bytes as UTF-8, replacing invalid sequences.
impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteView")
            .field("len", &self.len())
            .field("text", &String::from_utf8_lossy(&self.bytes))
            .finish()
    }
}
