//! Walks one client session through the whole protocol: the default
//! separators first, then a custom set installed with the control command.
//!
//! The session is driven exactly as a client of a character device would:
//! every write is a line, every read fills a small caller-owned buffer, and a
//! zero-length read marks the end of the line. A second zero-length read is
//! never issued; the endpoint would answer it with `NoMoreData`.
//!
//! Run with
//!
//! ```bash
//! cargo run -p linescan --example custom_separators
//! ```

use linescan::{ControlCommand, Device, DeviceError, ServiceOptions, SessionHandle};

fn print_tokens(device: &mut Device, handle: SessionHandle) -> Result<(), DeviceError> {
    // Deliberately small: long tokens come back truncated to 11 bytes.
    let mut buf = [0u8; 12];
    loop {
        let n = device.read(handle, &mut buf)?;
        if n == 0 {
            println!("  <end of line>");
            return Ok(());
        }
        println!("  {:?}", String::from_utf8_lossy(&buf[..n]));
    }
}

fn main() -> Result<(), DeviceError> {
    let mut device = Device::new(ServiceOptions::default())?;
    let handle = device.open()?;

    let line = "GET /static/app.js?v=42 HTTP/1.1\n";
    println!("default separators, {line:?}");
    device.write(handle, line.as_bytes())?;
    print_tokens(&mut device, handle)?;

    // CSV-ish record: only commas split, spaces stay inside fields.
    device.control(handle, ControlCommand::ArmSeparatorUpdate.into())?;
    device.write(handle, b",\n")?;
    let line = "Ada Lovelace,1815,Analytical Engine notes\n";
    println!("separators \",\", {line:?}");
    device.write(handle, line.as_bytes())?;
    print_tokens(&mut device, handle)?;

    device.close(handle);
    Ok(())
}
