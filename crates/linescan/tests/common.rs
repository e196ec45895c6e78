#![allow(missing_docs, dead_code)]

use core::fmt::Write;

use linescan::{Device, DeviceError, ServiceOptions, SessionHandle};

/// One step of a client script.
#[derive(Debug, Clone, Copy)]
pub enum Op<'a> {
    Arm,
    Control(u32),
    Write(&'a str),
    Read(usize),
    /// Reads with `usize` buffer length until end-of-stream (inclusive).
    Drain(usize),
}

/// Runs `ops` against a fresh session and renders one line per call.
pub fn transcript(options: ServiceOptions, ops: &[Op<'_>]) -> String {
    let mut device = Device::new(options).expect("valid options");
    let handle = device.open().expect("open");
    let mut out = String::new();
    for op in ops {
        run(&mut device, handle, *op, &mut out);
    }
    device.close(handle);
    out
}

fn run(device: &mut Device, handle: SessionHandle, op: Op<'_>, out: &mut String) {
    match op {
        Op::Arm => {
            device.control(handle, 0).unwrap();
            writeln!(out, "control(0)").unwrap();
        }
        Op::Control(raw) => {
            device.control(handle, raw).unwrap();
            writeln!(out, "control({raw})").unwrap();
        }
        Op::Write(line) => {
            let result = device.write(handle, line.as_bytes());
            writeln!(out, "write({line:?}) -> {}", render(result)).unwrap();
        }
        Op::Read(len) => {
            read_once(device, handle, len, out);
        }
        Op::Drain(len) => loop {
            if read_once(device, handle, len, out) {
                break;
            }
        },
    }
}

/// Returns whether the read ended the stream (end-of-stream or an error).
fn read_once(device: &mut Device, handle: SessionHandle, len: usize, out: &mut String) -> bool {
    let mut buf = vec![0xFF; len];
    match device.read(handle, &mut buf) {
        Ok(0) => {
            writeln!(out, "read({len}) -> end of stream").unwrap();
            true
        }
        Ok(n) => {
            assert_eq!(buf[n], 0, "token must be NUL-terminated");
            let token = String::from_utf8_lossy(&buf[..n]);
            writeln!(out, "read({len}) -> {token:?}").unwrap();
            false
        }
        Err(err) => {
            writeln!(out, "read({len}) -> error {}: {err}", err.errno()).unwrap();
            true
        }
    }
}

fn render(result: Result<usize, DeviceError>) -> String {
    match result {
        Ok(n) => n.to_string(),
        Err(err) => format!("error {}: {err}", err.errno()),
    }
}
