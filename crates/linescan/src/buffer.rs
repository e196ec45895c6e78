use bstr::{BStr, ByteSlice};

use crate::error::ScanError;

/// Owned byte buffer with a fixed capacity and an implicit terminator.
///
/// The buffer reserves its whole capacity up front, fallibly, and never grows
/// past it. There is no `Clone`; copies go through
/// [`try_clone`](Self::try_clone). The last slot is kept for the terminator,
/// so at most `capacity - 1` bytes are stored. Stored contents end at the
/// first NUL byte of the input; the terminator position is always `len()`.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct BoundedBuf {
    bytes: Vec<u8>,
    capacity: usize,
}

impl BoundedBuf {
    /// Reserves an empty buffer of `capacity` bytes.
    pub(crate) fn try_with_capacity(capacity: usize) -> Result<Self, ScanError> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(capacity)
            .map_err(|_| ScanError::ResourceExhausted)?;
        Ok(Self { bytes, capacity })
    }

    /// Reserves a new buffer of the same capacity holding the same bytes.
    pub(crate) fn try_clone(&self) -> Result<Self, ScanError> {
        let mut copy = Self::try_with_capacity(self.capacity)?;
        copy.bytes.extend_from_slice(&self.bytes);
        Ok(copy)
    }

    /// Size of the buffer, terminator slot included.
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Largest input accepted by [`replace`](Self::replace).
    #[inline]
    pub(crate) fn payload_capacity(&self) -> usize {
        self.capacity.saturating_sub(1)
    }

    /// Overwrites the contents with `src`, cut at its first NUL byte.
    ///
    /// Fails without touching the current contents if `src` is longer than
    /// the payload capacity.
    pub(crate) fn replace(&mut self, src: &[u8]) -> Result<(), ScanError> {
        let capacity = self.payload_capacity();
        if src.len() > capacity {
            return Err(ScanError::CapacityExceeded {
                len: src.len(),
                capacity,
            });
        }
        let end = src.find_byte(0).unwrap_or(src.len());
        self.bytes.clear();
        self.bytes.extend_from_slice(&src[..end]);
        Ok(())
    }

    /// Byte at `pos`, or `None` at (or past) the terminator.
    #[inline]
    pub(crate) fn get(&self, pos: usize) -> Option<u8> {
        self.bytes.get(pos).copied()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub(crate) fn as_bstr(&self) -> &BStr {
        self.bytes.as_bstr()
    }
}
