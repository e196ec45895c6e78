use core::fmt;

use bstr::BStr;

use crate::{buffer::BoundedBuf, error::ScanError};

/// Unordered set of boundary bytes, stored in a fixed-capacity buffer.
///
/// An empty set is legal: nothing is a boundary, so the remaining text is read
/// back as a single token.
#[derive(PartialEq, Eq)]
pub struct SeparatorSet {
    buf: BoundedBuf,
}

impl SeparatorSet {
    /// Builds a set from `bytes` in a buffer of `capacity` bytes.
    ///
    /// # Errors
    ///
    /// [`ScanError::ResourceExhausted`] if the buffer cannot be allocated,
    /// [`ScanError::CapacityExceeded`] if `bytes` does not fit.
    pub fn new(bytes: impl AsRef<[u8]>, capacity: usize) -> Result<Self, ScanError> {
        let mut buf = BoundedBuf::try_with_capacity(capacity)?;
        buf.replace(bytes.as_ref())?;
        Ok(Self { buf })
    }

    /// Whether `byte` is a boundary.
    #[inline]
    #[must_use]
    pub fn contains(&self, byte: u8) -> bool {
        self.buf.as_bytes().contains(&byte)
    }

    /// Overwrites the set. On error the previous contents are kept.
    ///
    /// # Errors
    ///
    /// [`ScanError::CapacityExceeded`] if `bytes` does not fit.
    pub fn replace(&mut self, bytes: impl AsRef<[u8]>) -> Result<(), ScanError> {
        self.buf.replace(bytes.as_ref())
    }

    /// Copies the set into a freshly reserved buffer.
    pub(crate) fn try_clone(&self) -> Result<Self, ScanError> {
        Ok(Self {
            buf: self.buf.try_clone()?,
        })
    }

    /// Size of the underlying buffer, terminator slot included.
    pub(crate) fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// The stored boundary bytes, in the order they were written.
    #[must_use]
    pub fn as_bstr(&self) -> &BStr {
        self.buf.as_bstr()
    }

    /// Number of stored bytes (duplicates included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether no byte is a boundary.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.len() == 0
    }
}

impl fmt::Debug for SeparatorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SeparatorSet").field(&self.as_bstr()).finish()
    }
}
