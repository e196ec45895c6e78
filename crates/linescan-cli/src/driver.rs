use std::io::{BufRead, Write};

use linescan::{ControlCommand, Device, DeviceError, ScanError, ServiceOptions, SessionHandle};
use tracing::{info, warn};

use crate::CliError;

/// Counters reported after a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub lines: usize,
    pub tokens: usize,
    pub skipped: usize,
}

/// Feeds input lines through one session and prints every token.
pub struct Driver {
    device: Device,
    handle: SessionHandle,
    read_len: usize,
}

impl Driver {
    /// Opens a session, installing `separators` first if given.
    pub fn new(
        options: ServiceOptions,
        separators: Option<&[u8]>,
        read_len: usize,
    ) -> Result<Self, CliError> {
        let mut device = Device::new(options)?;
        let handle = device.open()?;
        if let Some(separators) = separators {
            device.control(handle, ControlCommand::ArmSeparatorUpdate.into())?;
            device.write(handle, separators)?;
        }
        Ok(Self {
            device,
            handle,
            read_len,
        })
    }

    /// Tokenizes each line of `input`, writing one token per line to `out`.
    ///
    /// Lines too long for the session buffer are reported and skipped.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> Result<Summary, CliError> {
        let mut summary = Summary::default();
        let mut buf = vec![0u8; self.read_len];
        for line in input.split(b'\n') {
            let line = line?;
            summary.lines += 1;
            match self.device.write(self.handle, &line) {
                Ok(_) => {}
                Err(DeviceError::Scan(err @ ScanError::CapacityExceeded { .. })) => {
                    warn!(line = summary.lines, %err, "skipping line");
                    summary.skipped += 1;
                    continue;
                }
                Err(err) => return Err(err.into()),
            }
            loop {
                let n = self.device.read(self.handle, &mut buf)?;
                if n == 0 {
                    break;
                }
                out.write_all(&buf[..n])?;
                out.write_all(b"\n")?;
                summary.tokens += 1;
            }
        }
        out.flush()?;
        info!(
            lines = summary.lines,
            tokens = summary.tokens,
            skipped = summary.skipped,
            "done"
        );
        Ok(summary)
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.device.close(self.handle);
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use insta::assert_snapshot;

    use super::*;

    fn drive(
        options: ServiceOptions,
        separators: Option<&str>,
        read_len: usize,
        input: &str,
    ) -> (String, Summary) {
        let mut driver = Driver::new(options, separators.map(str::as_bytes), read_len).unwrap();
        let mut out = Vec::new();
        let summary = driver.run(Cursor::new(input), &mut out).unwrap();
        (String::from_utf8(out).unwrap(), summary)
    }

    #[test]
    fn tokenizes_each_line_with_defaults() {
        let (out, summary) = drive(
            ServiceOptions::default(),
            None,
            256,
            "Hello, world!\ncd /usr/local/bin\n",
        );
        assert_snapshot!(out, @r"
        Hello,
        world
        cd
        usr
        local
        bin
        ");
        assert_eq!(
            summary,
            Summary {
                lines: 2,
                tokens: 6,
                skipped: 0
            }
        );
    }

    #[test]
    fn custom_separators_apply_to_every_line() {
        let (out, _) = drive(ServiceOptions::default(), Some(","), 256, "a b,c\nd,e f");
        assert_snapshot!(out, @r"
        a b
        c
        d
        e f
        ");
    }

    #[test]
    fn long_lines_are_skipped_and_short_reads_truncate() {
        let options = ServiceOptions {
            capacity: 8,
            ..Default::default()
        };
        let (out, summary) = drive(options, None, 3, "abcd ef\nthis line is too long\nxyz\n");
        assert_snapshot!(out, @r"
        ab
        ef
        xy
        ");
        assert_eq!(
            summary,
            Summary {
                lines: 3,
                tokens: 3,
                skipped: 1
            }
        );
    }

    #[test]
    fn blank_lines_produce_no_tokens() {
        let (out, summary) = drive(ServiceOptions::default(), None, 16, "\n   \n");
        assert!(out.is_empty());
        assert_eq!(summary.lines, 2);
        assert_eq!(summary.tokens, 0);
    }
}
