#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use linescan::{Device, DeviceError, ScanError, ServiceOptions};

#[derive(Debug, Arbitrary)]
enum Op {
    Control(u32),
    Write(Vec<u8>),
    Read(u8),
    Reopen,
}

#[derive(Debug, Arbitrary)]
struct Input {
    capacity: u8,
    default_separators: Vec<u8>,
    ops: Vec<Op>,
}

/// Straight-line model of one session, used as the oracle.
struct Model {
    payload: usize,
    defaults: Vec<u8>,
    text: Vec<u8>,
    separators: Vec<u8>,
    cursor: usize,
    exhausted: bool,
    armed: bool,
}

enum Expected {
    Len(usize, Vec<u8>),
    NoMoreData,
}

fn until_nul(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().copied().take_while(|&b| b != 0).collect()
}

impl Model {
    fn new(payload: usize, defaults: Vec<u8>) -> Self {
        Self {
            payload,
            separators: defaults.clone(),
            defaults,
            text: Vec::new(),
            cursor: 0,
            exhausted: false,
            armed: false,
        }
    }

    fn reset(&mut self) {
        *self = Self::new(self.payload, self.defaults.clone());
    }

    fn write(&mut self, bytes: &[u8]) -> Result<usize, usize> {
        let line = match bytes.last() {
            Some(b'\n') => &bytes[..bytes.len() - 1],
            _ => bytes,
        };
        if line.len() > self.payload {
            return Err(line.len());
        }
        if self.armed {
            self.separators = until_nul(line);
            self.armed = false;
        } else {
            self.text = until_nul(line);
            self.cursor = 0;
            self.exhausted = false;
        }
        Ok(line.len())
    }

    fn read(&mut self, len: usize) -> Expected {
        let rest = &self.text[self.cursor..];
        let is_sep = |b: &u8| self.separators.contains(b);
        let Some(start) = rest.iter().position(|b| !is_sep(b)) else {
            self.cursor = self.text.len();
            if self.exhausted {
                return Expected::NoMoreData;
            }
            self.exhausted = true;
            return Expected::Len(0, Vec::new());
        };
        let run = rest[start..]
            .iter()
            .position(is_sep)
            .unwrap_or(rest.len() - start);
        let token: Vec<u8> = rest[start..start + run].iter().take(len - 1).copied().collect();
        self.cursor = (self.cursor + start + run + 1).min(self.text.len());
        Expected::Len(token.len(), token)
    }
}

fn drive(input: Input) {
    let capacity = usize::from(input.capacity).max(1);
    let options = ServiceOptions {
        default_separators: input.default_separators.clone().into(),
        capacity,
        max_sessions: None,
    };
    let Ok(mut device) = Device::new(options) else {
        assert!(input.default_separators.len() >= capacity);
        return;
    };
    let mut model = Model::new(capacity - 1, until_nul(&input.default_separators));
    let mut handle = device.open().expect("open");

    for op in input.ops {
        match op {
            Op::Control(raw) => {
                device.control(handle, raw).expect("control");
                if raw == 0 {
                    model.armed = true;
                }
            }
            Op::Write(bytes) => match (device.write(handle, &bytes), model.write(&bytes)) {
                (Ok(n), Ok(m)) => assert_eq!(n, m),
                (Err(DeviceError::Scan(ScanError::CapacityExceeded { len, .. })), Err(m)) => {
                    assert_eq!(len, m);
                }
                (got, want) => panic!("write mismatch: {got:?} vs {want:?}"),
            },
            Op::Read(len) => {
                let mut buf = vec![0xAA; usize::from(len)];
                let got = device.read(handle, &mut buf);
                if len == 0 {
                    assert_eq!(got, Err(DeviceError::TransportFault { available: 0 }));
                    continue;
                }
                match (got, model.read(usize::from(len))) {
                    (Ok(n), Expected::Len(m, token)) => {
                        assert_eq!(n, m);
                        assert_eq!(&buf[..n], token.as_slice());
                        assert_eq!(buf[n], 0);
                    }
                    (Err(err), Expected::NoMoreData) => assert!(err.is_no_more_data()),
                    (got, _) => panic!("read mismatch: {got:?}"),
                }
            }
            Op::Reopen => {
                device.close(handle);
                handle = device.open().expect("reopen");
                model.reset();
            }
        }
        device
            .session_mut(handle)
            .expect("open session")
            .assert_invariants();
    }
}

fuzz_target!(|input: Input| drive(input));
