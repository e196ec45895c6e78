use bstr::BString;

use crate::error::DeviceError;

/// Separators every new session starts with unless the service is configured
/// otherwise: space, `.`, `/`, `;`, `:`, `!` and `?`.
pub const DEFAULT_SEPARATORS: &[u8] = b" ./;:!?";

/// Size of each session buffer, terminator slot included.
pub const DEFAULT_CAPACITY: usize = 256;

/// Configuration for a [`Device`](crate::Device).
///
/// The options are fixed once the device is built: every session opened on
/// it copies `default_separators` and allocates buffers of `capacity` bytes.
///
/// # Examples
///
/// ```rust
/// use linescan::{Device, ServiceOptions};
///
/// let options = ServiceOptions {
///     default_separators: ",".into(),
///     max_sessions: Some(4),
///     ..Default::default()
/// };
/// let device = Device::new(options).unwrap();
/// assert_eq!(device.options().capacity, 256);
/// ```
///
/// # Default
///
/// Separators `" ./;:!?"`, 256-byte buffers, no session limit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct ServiceOptions {
    /// Separator set copied into each new session.
    ///
    /// # Default
    ///
    /// [`DEFAULT_SEPARATORS`]
    pub default_separators: BString,

    /// Size in bytes of every text and separator buffer.
    ///
    /// One byte is reserved for the terminator, so writes may carry at most
    /// `capacity - 1` bytes.
    ///
    /// # Default
    ///
    /// [`DEFAULT_CAPACITY`]
    pub capacity: usize,

    /// Maximum number of simultaneously open sessions.
    ///
    /// # Default
    ///
    /// `None` (unlimited)
    pub max_sessions: Option<usize>,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            default_separators: BString::from(DEFAULT_SEPARATORS),
            capacity: DEFAULT_CAPACITY,
            max_sessions: None,
        }
    }
}

impl ServiceOptions {
    /// Checks that sessions can be built from these options.
    ///
    /// # Errors
    ///
    /// [`DeviceError::InvalidOptions`] for a zero capacity or session limit,
    /// [`ScanError::CapacityExceeded`](crate::ScanError::CapacityExceeded) if
    /// the default separators do not fit a session buffer.
    pub fn validate(&self) -> Result<(), DeviceError> {
        if self.capacity == 0 {
            return Err(DeviceError::InvalidOptions(
                "capacity must leave room for the terminator",
            ));
        }
        if self.max_sessions == Some(0) {
            return Err(DeviceError::InvalidOptions("max_sessions must be non-zero"));
        }
        let payload = self.capacity - 1;
        if self.default_separators.len() > payload {
            return Err(crate::ScanError::CapacityExceeded {
                len: self.default_separators.len(),
                capacity: payload,
            }
            .into());
        }
        Ok(())
    }
}
