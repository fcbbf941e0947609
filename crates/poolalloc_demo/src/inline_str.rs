//! # Inline String
//!
//! Fixed-capacity UTF-8 string stored entirely inside a pool chunk.

use bytemuck::{Pod, Zeroable};
use std::fmt;
use thiserror::Error;

/// Maximum length of an [`InlineStr`] in bytes.
pub const INLINE_CAPACITY: usize = 31;

/// The string does not fit in an [`InlineStr`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("string of {len} bytes does not fit in {} bytes", INLINE_CAPACITY)]
pub struct InlineStrError {
    /// Length of the rejected string in bytes.
    pub len: usize,
}

/// A short string with no heap storage.
///
/// Plain-old-data, so it can be copied in and out of pool payloads as bytes.
#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct InlineStr {
    len: u8,
    bytes: [u8; INLINE_CAPACITY],
}

impl InlineStr {
    /// The empty string.
    pub const EMPTY: Self = Self {
        len: 0,
        bytes: [0; INLINE_CAPACITY],
    };

    /// Copies `text` into a new inline string.
    ///
    /// # Errors
    ///
    /// Returns [`InlineStrError`] if `text` is longer than [`INLINE_CAPACITY`] bytes.
    pub fn new(text: &str) -> Result<Self, InlineStrError> {
        let len = text.len();
        let Ok(short) = u8::try_from(len) else {
            return Err(InlineStrError { len });
        };
        if len > INLINE_CAPACITY {
            return Err(InlineStrError { len });
        }

        let mut out = Self::EMPTY;
        out.len = short;
        out.bytes[..len].copy_from_slice(text.as_bytes());
        Ok(out)
    }

    /// Returns the string contents.
    #[must_use]
    pub fn as_str(&self) -> &str {
        let len = usize::from(self.len).min(INLINE_CAPACITY);
        std::str::from_utf8(&self.bytes[..len]).unwrap_or_default()
    }

    /// Length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_str().len()
    }

    /// Whether the string is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl Default for InlineStr {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl TryFrom<&str> for InlineStr {
    type Error = InlineStrError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        Self::new(text)
    }
}

impl PartialEq for InlineStr {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for InlineStr {}

impl PartialEq<&str> for InlineStr {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Debug for InlineStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for InlineStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let s = InlineStr::new("29").unwrap();
        assert_eq!(s.as_str(), "29");
        assert_eq!(s.len(), 2);
        assert_eq!(s, "29");
        assert_eq!(s.to_string(), "29");
    }

    #[test]
    fn test_capacity_limit() {
        let full = "x".repeat(INLINE_CAPACITY);
        assert_eq!(InlineStr::new(&full).unwrap().len(), INLINE_CAPACITY);

        let long = "x".repeat(INLINE_CAPACITY + 1);
        assert_eq!(
            InlineStr::try_from(long.as_str()),
            Err(InlineStrError { len: 32 })
        );
        assert!(InlineStr::new(&"y".repeat(300)).is_err());
    }

    #[test]
    fn test_zeroed_is_empty() {
        let zeroed: InlineStr = Zeroable::zeroed();
        assert!(zeroed.is_empty());
        assert_eq!(zeroed, InlineStr::default());
        assert_eq!(std::mem::size_of::<InlineStr>(), 32);
    }

    #[test]
    fn test_multibyte() {
        let s = InlineStr::new("Grüße").unwrap();
        assert_eq!(s.as_str(), "Grüße");
        assert_eq!(format!("{s:?}"), "\"Grüße\"");
    }
}
