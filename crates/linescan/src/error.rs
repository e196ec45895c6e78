use thiserror::Error;

use crate::device::SessionHandle;

/// Argument list too long.
pub const E2BIG: i32 = 7;
/// Bad file descriptor.
pub const EBADF: i32 = 9;
/// Cannot allocate memory.
pub const ENOMEM: i32 = 12;
/// Bad address.
pub const EFAULT: i32 = 14;
/// Invalid argument.
pub const EINVAL: i32 = 22;

/// Failures raised by a single tokenizer session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// The input does not fit the fixed-capacity buffer it was written to.
    ///
    /// `capacity` is the payload capacity: one slot of the underlying buffer
    /// is always reserved for the terminator.
    #[error("input of {len} bytes exceeds buffer capacity of {capacity} bytes")]
    CapacityExceeded {
        /// Length of the rejected input.
        len: usize,
        /// Largest input the buffer accepts.
        capacity: usize,
    },
    /// Session buffers could not be allocated.
    #[error("out of memory while allocating session buffers")]
    ResourceExhausted,
    /// The text has already reported end-of-stream once.
    ///
    /// This is the terminal read signal rather than a fault; it repeats on
    /// every read until new text is written.
    #[error("no more data")]
    NoMoreData,
}

/// Failures surfaced by the [`Device`](crate::Device) endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// A session-level failure.
    #[error(transparent)]
    Scan(#[from] ScanError),
    /// The caller's buffer cannot carry the payload across the boundary.
    #[error("read buffer of {available} bytes cannot hold a terminated token")]
    TransportFault {
        /// Length of the caller's buffer.
        available: usize,
    },
    /// The handle does not name an open session.
    #[error("no open session for handle {0}")]
    BadHandle(SessionHandle),
    /// The service configuration is unusable.
    #[error("invalid service options: {0}")]
    InvalidOptions(&'static str),
}

impl DeviceError {
    /// Negative errno-style code, as a character device would return it.
    ///
    /// `NoMoreData` reports a bare `-1`.
    #[must_use]
    pub fn errno(&self) -> i32 {
        match self {
            DeviceError::Scan(ScanError::CapacityExceeded { .. }) => -E2BIG,
            DeviceError::Scan(ScanError::ResourceExhausted) => -ENOMEM,
            DeviceError::Scan(ScanError::NoMoreData) => -1,
            DeviceError::TransportFault { .. } => -EFAULT,
            DeviceError::BadHandle(_) => -EBADF,
            DeviceError::InvalidOptions(_) => -EINVAL,
        }
    }

    /// Whether this is the terminal read signal rather than a real failure.
    #[must_use]
    pub fn is_no_more_data(&self) -> bool {
        matches!(self, DeviceError::Scan(ScanError::NoMoreData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let err: DeviceError = ScanError::CapacityExceeded {
            len: 300,
            capacity: 255,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "input of 300 bytes exceeds buffer capacity of 255 bytes"
        );

        let mut device = crate::Device::new(crate::ServiceOptions::default()).unwrap();
        let handle = device.open().unwrap();
        device.close(handle);
        assert_eq!(
            DeviceError::BadHandle(handle).to_string(),
            format!("no open session for handle {handle}")
        );
    }

    #[test]
    fn only_no_more_data_is_terminal() {
        assert!(DeviceError::from(ScanError::NoMoreData).is_no_more_data());
        assert!(!DeviceError::from(ScanError::ResourceExhausted).is_no_more_data());
        assert!(!DeviceError::TransportFault { available: 0 }.is_no_more_data());
        assert_eq!(DeviceError::InvalidOptions("capacity").errno(), -EINVAL);
    }
}
