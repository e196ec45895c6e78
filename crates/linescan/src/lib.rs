//! Stateful line tokenizer behind a file-like read/write protocol.
//!
//! A client opens a session on a [`Device`], writes a line of text and reads
//! tokens back one at a time until end-of-stream. A control command arms the
//! session so that its next write replaces the separator set instead of the
//! text.
//!
//! ```rust
//! use linescan::{Device, ServiceOptions};
//!
//! let mut device = Device::new(ServiceOptions::default()).unwrap();
//! let handle = device.open().unwrap();
//! device.write(handle, b"Hello, world!\n").unwrap();
//!
//! let mut buf = [0u8; 32];
//! let mut tokens = Vec::new();
//! loop {
//!     let n = device.read(handle, &mut buf).unwrap();
//!     if n == 0 {
//!         break;
//!     }
//!     tokens.push(String::from_utf8_lossy(&buf[..n]).into_owned());
//! }
//! assert_eq!(tokens, ["Hello,", "world"]);
//! ```

mod buffer;
mod device;
mod error;
mod options;
mod separators;
mod session;


pub use device::{ControlCommand, Device, SessionHandle};
pub use error::{DeviceError, E2BIG, EBADF, EFAULT, EINVAL, ENOMEM, ScanError};
pub use options::{DEFAULT_CAPACITY, DEFAULT_SEPARATORS, ServiceOptions};
pub use separators::SeparatorSet;
pub use session::{Scan, TokenizerSession, Tokens, WriteIntent, WriteMode};
