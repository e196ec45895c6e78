//! Device: the file-like endpoint in front of the tokenizer sessions.
//!
//! Each `open` creates a [`TokenizerSession`] seeded from the device's default
//! separators and hands back an opaque [`SessionHandle`]. The remaining calls
//! mirror a character device: `control` for the one supported command, `write`
//! for a line, `read` into a caller-supplied buffer.

use std::{collections::BTreeMap, fmt};

use tracing::{debug, warn};

use crate::{
    error::{DeviceError, ScanError},
    options::ServiceOptions,
    separators::SeparatorSet,
    session::{Scan, TokenizerSession, WriteMode},
};

/// Opaque identifier of an open session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionHandle(u64);

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Commands accepted by [`Device::control`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ControlCommand {
    /// Route the next write on the session to its separator set.
    ArmSeparatorUpdate = 0,
}

impl ControlCommand {
    /// Decodes a raw command number. Unknown numbers yield `None`.
    #[must_use]
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(ControlCommand::ArmSeparatorUpdate),
            _ => None,
        }
    }
}

impl From<ControlCommand> for u32 {
    fn from(command: ControlCommand) -> Self {
        command as u32
    }
}

/// Tokenizer endpoint owning every open session.
///
/// # Examples
///
/// ```rust
/// use linescan::{ControlCommand, Device, ServiceOptions};
///
/// let mut device = Device::new(ServiceOptions::default()).unwrap();
/// let handle = device.open().unwrap();
///
/// device.control(handle, ControlCommand::ArmSeparatorUpdate.into()).unwrap();
/// device.write(handle, b",\n").unwrap();
/// device.write(handle, b"red,green\n").unwrap();
///
/// let mut buf = [0u8; 16];
/// let n = device.read(handle, &mut buf).unwrap();
/// assert_eq!(&buf[..n], b"red");
/// assert_eq!(buf[n], 0);
/// let n = device.read(handle, &mut buf).unwrap();
/// assert_eq!(&buf[..n], b"green");
/// assert_eq!(device.read(handle, &mut buf).unwrap(), 0);
/// assert!(device.read(handle, &mut buf).unwrap_err().is_no_more_data());
///
/// device.close(handle);
/// ```
#[derive(Debug)]
pub struct Device {
    options: ServiceOptions,
    defaults: SeparatorSet,
    sessions: BTreeMap<SessionHandle, TokenizerSession>,
    next_handle: u64,
}

impl Device {
    /// Builds a device from validated options.
    ///
    /// # Errors
    ///
    /// Any error from [`ServiceOptions::validate`], or
    /// [`ScanError::ResourceExhausted`] if the default separator buffer cannot
    /// be allocated.
    pub fn new(options: ServiceOptions) -> Result<Self, DeviceError> {
        options.validate()?;
        let defaults = SeparatorSet::new(&options.default_separators, options.capacity)?;
        debug!(
            separators = %defaults.as_bstr(),
            capacity = options.capacity,
            "device initialized"
        );
        Ok(Self {
            options,
            defaults,
            sessions: BTreeMap::new(),
            next_handle: 0,
        })
    }

    /// The options this device was built with.
    #[must_use]
    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    /// Number of open sessions.
    #[must_use]
    pub fn open_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Opens a new session.
    ///
    /// # Errors
    ///
    /// [`ScanError::ResourceExhausted`] if the session limit is reached or the
    /// session buffers cannot be allocated.
    pub fn open(&mut self) -> Result<SessionHandle, DeviceError> {
        if self
            .options
            .max_sessions
            .is_some_and(|max| self.sessions.len() >= max)
        {
            warn!(open = self.sessions.len(), "session limit reached");
            return Err(ScanError::ResourceExhausted.into());
        }
        let session = TokenizerSession::new(&self.defaults).inspect_err(|err| {
            warn!(%err, "session allocation failed");
        })?;
        let handle = SessionHandle(self.next_handle);
        self.next_handle += 1;
        self.sessions.insert(handle, session);
        debug!(%handle, "session opened");
        Ok(handle)
    }

    /// Closes a session, dropping its state. Closing twice is a no-op.
    pub fn close(&mut self, handle: SessionHandle) {
        if self.sessions.remove(&handle).is_some() {
            debug!(%handle, "session closed");
        }
    }

    /// Issues a raw control command.
    ///
    /// Only [`ControlCommand::ArmSeparatorUpdate`] does anything; other
    /// command numbers are accepted and ignored.
    ///
    /// # Errors
    ///
    /// [`DeviceError::BadHandle`] if the session is not open.
    pub fn control(&mut self, handle: SessionHandle, command: u32) -> Result<(), DeviceError> {
        let session = self.session_mut(handle)?;
        match ControlCommand::from_raw(command) {
            Some(ControlCommand::ArmSeparatorUpdate) => session.arm(),
            None => debug!(%handle, command, "ignoring unknown control command"),
        }
        Ok(())
    }

    /// Writes one line to a session.
    ///
    /// A single trailing `\n` is stripped. The rest replaces the session's
    /// text, or its separators if it was armed. Returns the number of bytes
    /// taken after stripping.
    ///
    /// # Errors
    ///
    /// [`DeviceError::BadHandle`] if the session is not open,
    /// [`ScanError::CapacityExceeded`] if the line is too long.
    pub fn write(&mut self, handle: SessionHandle, bytes: &[u8]) -> Result<usize, DeviceError> {
        let session = self.session_mut(handle)?;
        let line = bytes.strip_suffix(b"\n").unwrap_or(bytes);
        let mode = session.write(line)?;
        if mode == WriteMode::Separators {
            debug!(%handle, separators = %session.separators().as_bstr(), "separators replaced");
        }
        Ok(line.len())
    }

    /// Reads the next token into `buf`.
    ///
    /// At most `buf.len() - 1` token bytes are copied, followed by a NUL.
    /// Returns the token length; `0` signals end-of-stream.
    ///
    /// # Errors
    ///
    /// [`DeviceError::BadHandle`] if the session is not open,
    /// [`DeviceError::TransportFault`] if `buf` is empty,
    /// [`ScanError::NoMoreData`] once end-of-stream has been reported.
    pub fn read(&mut self, handle: SessionHandle, buf: &mut [u8]) -> Result<usize, DeviceError> {
        let session = self.session_mut(handle)?;
        if buf.is_empty() {
            return Err(DeviceError::TransportFault { available: 0 });
        }
        let token = match session.next_token(buf.len())? {
            Scan::Token(token) => token,
            Scan::EndOfStream => {
                debug!(%handle, "end of stream");
                buf[0] = 0;
                return Ok(0);
            }
        };
        let n = token.len();
        buf[..n].copy_from_slice(token);
        buf[n] = 0;
        Ok(n)
    }

    /// Direct access to an open session.
    ///
    /// # Errors
    ///
    /// [`DeviceError::BadHandle`] if the session is not open.
    pub fn session_mut(
        &mut self,
        handle: SessionHandle,
    ) -> Result<&mut TokenizerSession, DeviceError> {
        self.sessions
            .get_mut(&handle)
            .ok_or(DeviceError::BadHandle(handle))
    }
}
